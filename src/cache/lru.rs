//! LRU Tracker Module
//!
//! Least-recently-used ordering for bounding the cache size.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access recency with a monotonically increasing tick.
///
/// `by_tick` orders keys from least to most recently used; `ticks` maps each
/// key back to its current position so touches stay logarithmic.
#[derive(Debug, Default)]
pub struct LruTracker {
    ticks: HashMap<String, u64>,
    by_tick: BTreeMap<u64, String>,
    next_tick: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, tracking it if new.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(old) => {
                if let Some(owned) = self.by_tick.remove(&*old) {
                    self.by_tick.insert(tick, owned);
                }
                *old = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
                self.by_tick.insert(tick, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Stops tracking a key.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
