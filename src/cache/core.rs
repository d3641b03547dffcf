//! Cache Core Module
//!
//! Synchronous cache operations: orchestrates the codec, the
//! encryption capability and the store, and is the single place that
//! decides whether a stored entry is still readable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::codec;
use crate::cache::expiry::{Expiry, UNBOUNDED_TTL_MS};
use crate::crypto::EncrypterDecrypter;
use crate::error::{CacheError, Result};
use crate::store::Store;

// == Cache Core ==
/// Owns the store handle and the encryption capability for one cache.
///
/// Callers hold it through [`Cache`](crate::Cache); operations may be
/// invoked from any thread and block for the duration of the store
/// I/O. No locking is added beyond what the store provides per call.
pub struct CacheCore {
    store: Box<dyn Store>,
    crypto: Box<dyn EncrypterDecrypter>,
    logging: bool,
}

impl CacheCore {
    // == Constructor ==
    pub fn new(
        store: Box<dyn Store>,
        crypto: Box<dyn EncrypterDecrypter>,
        logging: bool,
    ) -> Self {
        Self {
            store,
            crypto,
            logging,
        }
    }

    // == Put ==
    /// Stores a value under `key`.
    ///
    /// `ttl_ms` of `None` means the entry is never time-expired and
    /// can only leave the cache through the store's size eviction or
    /// an explicit remove. The write may push the store over its
    /// budget and evict unrelated least-recently-used keys.
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl_ms: Option<u64>) -> Result<()> {
        let expiry = Expiry::from_span(ttl_ms.unwrap_or(UNBOUNDED_TTL_MS));
        let (payload, metadata) =
            codec::encode(key, value, expiry.eviction_time, self.crypto.as_ref())?;
        self.store.put(key, payload, metadata)?;
        if self.logging {
            debug!(key, "[PUT]");
        }
        Ok(())
    }

    // == Get ==
    /// Retrieves the value under `key`, or `None` when the key was
    /// never written, was evicted by the store, or has expired.
    ///
    /// The deadline is checked before any decryption work. An expired
    /// entry is removed from the store before the miss is reported, so
    /// a later `contains` will not see it either.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(entry) = self.store.get(key)? else {
            if self.logging {
                debug!(key, "[MISS]");
            }
            return Ok(None);
        };

        let eviction_time = codec::eviction_time_of(key, &entry.metadata)?;
        if Expiry::from_eviction_time(eviction_time).is_expired() {
            if self.logging {
                debug!(key, "[EXPIRED]");
            }
            self.remove(key)?;
            return Ok(None);
        }

        let bytes = codec::open_payload(key, &entry.payload, self.crypto.as_ref())?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|err| CacheError::Decoding(key.to_string(), err.to_string()))?;
        if self.logging {
            debug!(key, "[HIT]");
        }
        Ok(Some(value))
    }

    // == Remove ==
    /// Deletes the entry under `key`. Removing an absent key succeeds.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key)?;
        if self.logging {
            debug!(key, "[REMOVED]");
        }
        Ok(())
    }

    // == Contains ==
    /// Reports store presence only, without checking expiration: a
    /// time-expired entry that no read has evicted yet still reports
    /// `true`. Use [`get`](Self::get) for expiration-aware presence.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains(key)?)
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        if self.logging {
            debug!("[ALL CLEARED]");
        }
        Ok(())
    }
}
