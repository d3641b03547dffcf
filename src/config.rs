//! Configuration Module
//!
//! Holds the options recognized when opening a cache.

use std::env;
use std::path::PathBuf;

/// Default size budget for the on-disk store (10 MB).
pub const DEFAULT_SIZE_BUDGET_BYTES: u64 = 10 * 1024 * 1024;

/// Cache configuration parameters.
///
/// Constructed directly, via the builder-style setters, or from
/// environment variables.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory the store lives in (created if absent)
    pub storage_location: PathBuf,
    /// Total payload byte budget before the store evicts LRU entries
    pub size_budget_bytes: u64,
    /// Emit one tracing line per operation outcome
    pub logging_enabled: bool,
    /// Encrypt payloads at rest with the keychain encrypter
    pub encryption_enabled: bool,
}

impl CacheConfig {
    /// Creates a config for the given store directory and size budget,
    /// with logging and encryption off.
    pub fn new(storage_location: impl Into<PathBuf>, size_budget_bytes: u64) -> Self {
        Self {
            storage_location: storage_location.into(),
            size_budget_bytes,
            logging_enabled: false,
            encryption_enabled: false,
        }
    }

    /// Enables or disables per-operation logging.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// Enables or disables at-rest encryption.
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.encryption_enabled = enabled;
        self
    }

    /// Creates a config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Store directory (default: `<tmp>/expirable-cache`)
    /// - `CACHE_SIZE_BUDGET` - Size budget in bytes (default: 10485760)
    /// - `CACHE_LOGGING` - Per-operation logging, `true`/`false` (default: false)
    /// - `CACHE_ENCRYPTION` - At-rest encryption, `true`/`false` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_location: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_location),
            size_budget_bytes: env::var("CACHE_SIZE_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.size_budget_bytes),
            logging_enabled: env::var("CACHE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.logging_enabled),
            encryption_enabled: env::var("CACHE_ENCRYPTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.encryption_enabled),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage_location: env::temp_dir().join("expirable-cache"),
            size_budget_bytes: DEFAULT_SIZE_BUDGET_BYTES,
            logging_enabled: false,
            encryption_enabled: false,
        }
    }
}
