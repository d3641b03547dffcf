//! Crypto Module
//!
//! The pluggable encryption capability applied to payload bytes before
//! they reach the store. Two variants exist: a no-op passthrough for
//! caches without encryption, and a keychain-backed AES-GCM encrypter.
//! The variant is selected once when the cache is opened, never at
//! runtime per call.

mod keychain;

use thiserror::Error;

pub use keychain::KeychainEncrypter;

// == Crypto Error Enum ==
/// Failures of the encryption capability.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key material could not be loaded or created
    #[error("Encryption unavailable: {0}")]
    Unavailable(String),

    /// Sealing the plaintext failed
    #[error("Encrypt failed: {0}")]
    Encrypt(String),

    /// Ciphertext could not be opened (wrong key, wrong id, or tampering)
    #[error("Decrypt failed: {0}")]
    Decrypt(String),
}

// == Encrypter Decrypter Trait ==
/// Symmetric transform applied to serialized value bytes.
///
/// `id` is the cache key of the entry being sealed. Implementations
/// must bind ciphertext to it so bytes written for one key cannot be
/// opened under another.
pub trait EncrypterDecrypter: Send + Sync {
    fn encrypt(&self, data: &[u8], id: &str) -> Result<Vec<u8>, CryptoError>;
    fn decrypt(&self, data: &[u8], id: &str) -> Result<Vec<u8>, CryptoError>;
}

// == No-op Encrypter ==
/// Identity transform used when encryption is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEncrypter;

impl EncrypterDecrypter for NoopEncrypter {
    fn encrypt(&self, data: &[u8], _id: &str) -> Result<Vec<u8>, CryptoError> {
        Ok(data.to_vec())
    }

    fn decrypt(&self, data: &[u8], _id: &str) -> Result<Vec<u8>, CryptoError> {
        Ok(data.to_vec())
    }
}
