//! Store Module
//!
//! The persistence contract consumed by the cache layer, plus the
//! bundled disk-backed implementation. The cache core only ever talks to
//! the [`Store`] trait; any size-bounded key-value store that persists a
//! string payload with a metadata record verbatim can stand in for
//! [`DiskStore`].

mod disk;
mod ledger;

use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

// Re-export public types
pub use disk::DiskStore;
pub use ledger::UsageLedger;

/// Auxiliary record persisted verbatim next to each payload.
pub type Metadata = HashMap<String, serde_json::Value>;

// == Store Entry ==
/// What the store hands back for a present key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Opaque payload string written by the cache layer
    pub payload: String,
    /// Metadata map, returned unmodified
    pub metadata: Metadata,
}

// == Store Trait ==
/// Contract of the underlying size-bounded key-value store.
///
/// Implementations are thread-safe per call but offer no cross-call
/// transactions; the cache layer adds no locking of its own on top.
pub trait Store: Send + Sync {
    /// Persists `payload` and `metadata` under `key`, overwriting any
    /// previous entry. May evict least-recently-used entries once the
    /// cumulative payload size exceeds the store's budget.
    fn put(&self, key: &str, payload: String, metadata: Metadata) -> io::Result<()>;

    /// Returns the entry for `key`, or `None` if absent.
    fn get(&self, key: &str) -> io::Result<Option<StoreEntry>>;

    /// Deletes the entry for `key`. Absent keys are a no-op.
    fn remove(&self, key: &str) -> io::Result<()>;

    /// Reports whether `key` is currently present.
    fn contains(&self, key: &str) -> io::Result<bool>;

    /// Deletes every entry.
    fn clear(&self) -> io::Result<()>;
}
