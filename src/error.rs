//! Error types for the expirable cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Absence is never an error: a missing or expired key comes back as
/// `Ok(None)` from [`get`](crate::Cache::get). These variants cover
/// genuine failures only.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The store or the encryption capability could not be initialized
    #[error("Initialization failed: {0}")]
    Init(String),

    /// Value could not be serialized for storage
    #[error("Failed to encode value for key '{0}': {1}")]
    Encoding(String, #[source] serde_json::Error),

    /// Stored payload could not be turned back into a value
    #[error("Failed to decode value for key '{0}': {1}")]
    Decoding(String, String),

    /// The encryption capability rejected the value bytes
    #[error("Encryption failed for key '{0}': {1}")]
    Encryption(String, String),

    /// Stored ciphertext could not be opened
    #[error("Decryption failed for key '{0}': {1}")]
    Decryption(String, String),

    /// I/O failure from the underlying store
    #[error("Store I/O failed: {0}")]
    Store(#[from] std::io::Error),

    /// Entry metadata is missing or carries a wrong-typed eviction time
    #[error("Malformed metadata for key '{0}': {1}")]
    MalformedMetadata(String, String),

    /// A background execution task died before delivering its outcome
    #[error("Background task failed: {0}")]
    Background(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
