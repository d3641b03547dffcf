//! Expiry Module
//!
//! Eviction-deadline arithmetic for cache entries.

use chrono::Utc;

/// TTL span meaning "never time-expired". With saturating addition the
/// resulting deadline is `u64::MAX`, unreachable by any real clock.
pub const UNBOUNDED_TTL_MS: u64 = u64::MAX;

/// Returns the current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

// == Expiry ==
/// Absolute eviction deadline of an entry, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Instant after which the entry must no longer be served
    pub eviction_time: u64,
}

impl Expiry {
    // == From Span ==
    /// Computes the deadline `now + span_ms`.
    ///
    /// Addition saturates so a huge caller-supplied span cannot wrap
    /// around into an already-elapsed deadline.
    pub fn from_span(span_ms: u64) -> Self {
        Self {
            eviction_time: now_ms().saturating_add(span_ms),
        }
    }

    // == From Eviction Time ==
    /// Wraps a deadline read back from entry metadata.
    pub fn from_eviction_time(eviction_time: u64) -> Self {
        Self { eviction_time }
    }

    // == Is Expired ==
    /// Checks whether the deadline has passed.
    ///
    /// The boundary instant itself is still valid: an entry expires
    /// only once `now` is strictly greater than its eviction time.
    pub fn is_expired(&self) -> bool {
        now_ms() > self.eviction_time
    }

    // == Remaining ==
    /// Returns the remaining validity in milliseconds, 0 once expired.
    pub fn remaining_ms(&self) -> u64 {
        self.eviction_time.saturating_sub(now_ms())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_unbounded_span_never_expires() {
        let expiry = Expiry::from_span(UNBOUNDED_TTL_MS);

        assert_eq!(expiry.eviction_time, u64::MAX);
        assert!(!expiry.is_expired());
    }

    #[test]
    fn test_short_span_expires() {
        let expiry = Expiry::from_span(50);

        assert!(!expiry.is_expired());
        sleep(Duration::from_millis(80));
        assert!(expiry.is_expired());
    }

    #[test]
    fn test_deadline_comparison_is_strict() {
        let now = now_ms();

        // Future deadline: valid
        assert!(!Expiry::from_eviction_time(now + 60_000).is_expired());
        // Past deadline: expired
        assert!(Expiry::from_eviction_time(now.saturating_sub(60_000)).is_expired());
    }

    #[test]
    fn test_remaining_ms() {
        let expiry = Expiry::from_span(10_000);

        let remaining = expiry.remaining_ms();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_remaining_ms_expired_is_zero() {
        let expiry = Expiry::from_eviction_time(now_ms().saturating_sub(5_000));
        assert_eq!(expiry.remaining_ms(), 0);
    }

    #[test]
    fn test_saturating_deadline_does_not_wrap() {
        let expiry = Expiry::from_span(u64::MAX - 10);
        assert_eq!(expiry.eviction_time, u64::MAX);
    }
}
