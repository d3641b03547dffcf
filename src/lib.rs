//! Expirable Cache - A disk-backed key-value cache
//!
//! Layers per-entry TTL expiration, serde serialization and optional
//! at-rest encryption over a size-bounded, LRU-evicting disk store,
//! with both blocking and tokio-based non-blocking APIs.

pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod nonblocking;
pub mod store;

pub use cache::{Cache, UNBOUNDED_TTL_MS};
pub use config::CacheConfig;
pub use crypto::{CryptoError, EncrypterDecrypter, KeychainEncrypter, NoopEncrypter};
pub use error::{CacheError, Result};
pub use nonblocking::AsyncCache;
pub use store::{DiskStore, Metadata, Store, StoreEntry};
