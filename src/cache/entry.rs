//! Cache Entry Module
//!
//! A captured upstream response and the moment it was stored.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

// == Cache Entry ==
/// Represents a single cached response body with its TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Re-serialized JSON body
    pub value: Bytes,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Lifetime in seconds, measured from `inserted_at`
    pub ttl_seconds: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Bytes, ttl_seconds: u64) -> Self {
        Self {
            value,
            inserted_at: current_timestamp_ms(),
            ttl_seconds,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since insertion.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived its TTL.
    ///
    /// An entry is expired only once its age strictly exceeds the TTL, so a
    /// read landing exactly on the boundary is still a hit.
    pub fn is_expired(&self) -> bool {
        self.age_ms() > self.ttl_seconds.saturating_mul(1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as zero.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(Bytes::from_static(b"{}"), 60);

        assert_eq!(entry.value, Bytes::from_static(b"{}"));
        assert_eq!(entry.ttl_seconds, 60);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(Bytes::from_static(b"{}"), 1);

        assert!(!entry.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_boundary_is_not_expired() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            value: Bytes::new(),
            inserted_at: now + 60_000, // age saturates to zero
            ttl_seconds: 0,
        };

        assert!(!entry.is_expired(), "age equal to TTL is still fresh");
    }

    #[test]
    fn test_old_entry_is_expired() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            value: Bytes::new(),
            inserted_at: now - 5_000,
            ttl_seconds: 4,
        };

        assert!(entry.is_expired());
    }
}
