//! Cache Store Module
//!
//! Response cache combining HashMap storage with LRU tracking and lazy TTL expiry.

use std::collections::HashMap;

use bytes::Bytes;

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_VALUE_SIZE};
use crate::error::{GatewayError, Result};

// == Cache Store ==
/// Bounded response cache keyed by request identity.
///
/// Expiry is lazy: a stale entry reads as a miss but stays in the map until
/// it is overwritten, evicted, or swept by [`CacheStore::cleanup_expired`].
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` responses.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Put ==
    /// Stores a response body under `key` for `ttl_seconds`.
    ///
    /// Overwrites any previous entry and restarts its TTL. A zero TTL stores
    /// nothing. When inserting a new key at capacity, the least recently used
    /// entry is evicted first.
    pub fn put(&mut self, key: String, value: Bytes, ttl_seconds: u64) -> Result<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(GatewayError::ValueTooLarge(value.len()));
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl_seconds));
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the cached body if present and fresh.
    ///
    /// An expired entry is reported as absent and left in place.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.stats.record_expired();
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    /// Whether an entry, fresh or stale, is physically held for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn body(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = CacheStore::new(100);

        store.put("GET /a".into(), body(r#"{"a":1}"#), 60).unwrap();

        assert_eq!(store.get("GET /a"), Some(body(r#"{"a":1}"#)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_absent() {
        let mut store = CacheStore::new(100);
        assert_eq!(store.get("GET /nothing"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(100);

        store.put("GET /a".into(), body("1"), 60).unwrap();
        store.put("GET /a".into(), body("2"), 60).unwrap();

        assert_eq!(store.get("GET /a"), Some(body("2")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_not_stored() {
        let mut store = CacheStore::new(100);

        store.put("GET /a".into(), body("1"), 0).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_entry_is_a_miss_but_not_removed() {
        let mut store = CacheStore::new(100);

        store.put("GET /a".into(), body("1"), 1).unwrap();
        assert!(store.get("GET /a").is_some());

        sleep(Duration::from_millis(1100));

        assert_eq!(store.get("GET /a"), None);
        assert!(store.contains("GET /a"), "lazy expiry keeps the entry");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_put_after_expiry_refreshes_entry() {
        let mut store = CacheStore::new(100);

        store.put("GET /a".into(), body("old"), 1).unwrap();
        sleep(Duration::from_millis(1100));
        store.put("GET /a".into(), body("new"), 1).unwrap();

        assert_eq!(store.get("GET /a"), Some(body("new")));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(3);

        store.put("k1".into(), body("1"), 60).unwrap();
        store.put("k2".into(), body("2"), 60).unwrap();
        store.put("k3".into(), body("3"), 60).unwrap();

        // Reading k1 makes k2 the least recently used
        store.get("k1").unwrap();
        store.put("k4".into(), body("4"), 60).unwrap();

        assert_eq!(store.len(), 3);
        assert!(!store.contains("k2"));
        assert!(store.contains("k1"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = CacheStore::new(2);

        store.put("k1".into(), body("1"), 60).unwrap();
        store.put("k2".into(), body("2"), 60).unwrap();
        store.put("k1".into(), body("1b"), 60).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(100);

        store.put("short".into(), body("1"), 1).unwrap();
        store.put("long".into(), body("2"), 60).unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_value_too_large() {
        let mut store = CacheStore::new(100);
        let large = Bytes::from(vec![b'x'; MAX_VALUE_SIZE + 1]);

        let result = store.put("GET /big".into(), large, 60);

        assert!(matches!(result, Err(GatewayError::ValueTooLarge(_))));
        assert!(store.is_empty());
    }
}
