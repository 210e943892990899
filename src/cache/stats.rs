//! Cache Statistics Module
//!
//! Hit, miss, expiry and eviction counters for the response cache.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to the upstream (absent or expired)
    pub misses: u64,
    /// Subset of `misses` that found an expired entry
    pub expired: u64,
    /// Entries dropped to honor the capacity bound
    pub evictions: u64,
    /// Entries physically held, fresh or not
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts a lookup that found a stale entry; also a miss.
    pub fn record_expired(&mut self) {
        self.expired += 1;
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
