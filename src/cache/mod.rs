//! Cache Module
//!
//! TTL-expiring cache layered over the size-bounded store: deadline
//! arithmetic, the entry codec, the synchronous core, and the public
//! handle.

pub mod codec;
mod core;
mod expiry;
mod handle;


// Re-export public types
pub use codec::EVICTION_TIME_KEY;
pub use expiry::{now_ms, Expiry, UNBOUNDED_TTL_MS};
pub use handle::Cache;
pub use self::core::CacheCore;
