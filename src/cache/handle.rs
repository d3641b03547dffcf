//! Cache Handle Module
//!
//! The caller-facing handle. Cheap to clone and safe to share across
//! threads; every clone talks to the same store and key material.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::core::CacheCore;
use crate::config::CacheConfig;
use crate::crypto::{EncrypterDecrypter, KeychainEncrypter, NoopEncrypter};
use crate::error::{CacheError, Result};
use crate::store::{DiskStore, Store};

/// Store format version written by this crate.
const STORE_VERSION: u32 = 1;

// == Cache ==
/// A disk-backed key-value cache with per-entry TTL expiration.
#[derive(Clone)]
pub struct Cache {
    core: Arc<CacheCore>,
}

impl Cache {
    // == Open ==
    /// Opens or creates a cache per `config`.
    ///
    /// When encryption is enabled the keychain encrypter is set up in
    /// the same directory; a keychain that cannot be initialized fails
    /// the open rather than falling back to plaintext. Each call
    /// returns an independent cache; keeping two live handles over the
    /// same directory is not supported.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let crypto: Box<dyn EncrypterDecrypter> = if config.encryption_enabled {
            Box::new(
                KeychainEncrypter::new(&config.storage_location)
                    .map_err(|err| CacheError::Init(err.to_string()))?,
            )
        } else {
            Box::new(NoopEncrypter)
        };

        Self::open_with_encrypter(config, crypto)
    }

    // == Open With Encrypter ==
    /// Like [`open`](Self::open), but with a caller-supplied
    /// encryption capability instead of the keychain encrypter. The
    /// config's `encryption_enabled` flag is ignored; the given
    /// capability is always used.
    pub fn open_with_encrypter(
        config: CacheConfig,
        crypto: Box<dyn EncrypterDecrypter>,
    ) -> Result<Self> {
        let store = DiskStore::open(
            &config.storage_location,
            STORE_VERSION,
            config.size_budget_bytes,
        )
        .map_err(|err| CacheError::Init(format!("cannot open store: {err}")))?;

        Ok(Self::new(Box::new(store), crypto, config.logging_enabled))
    }

    // == New ==
    /// Builds a cache from an explicit store and encryption capability.
    ///
    /// This is the seam tests and embedders use to supply their own
    /// store implementation or encrypter.
    pub fn new(
        store: Box<dyn Store>,
        crypto: Box<dyn EncrypterDecrypter>,
        logging_enabled: bool,
    ) -> Self {
        Self {
            core: Arc::new(CacheCore::new(store, crypto, logging_enabled)),
        }
    }

    // == Operations ==
    /// Stores `value` under `key` with an optional TTL in milliseconds.
    ///
    /// Without a TTL the entry never time-expires; the store's size
    /// eviction remains the only way it leaves the cache implicitly.
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl_ms: Option<u64>) -> Result<()> {
        self.core.put(key, value, ttl_ms)
    }

    /// Retrieves the value under `key`, `None` on miss or expiration.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.core.get(key)
    }

    /// Deletes the entry under `key`; absent keys are a no-op success.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.core.remove(key)
    }

    /// Reports store presence without checking expiration.
    ///
    /// A time-expired entry no read has evicted yet still reports
    /// `true` here; call [`get`](Self::get) for expiration-aware
    /// presence.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.core.contains(key)
    }

    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        self.core.clear()
    }
}
