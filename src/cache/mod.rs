//! Cache Module
//!
//! In-memory response cache with lazy TTL expiry and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Largest response body the cache will hold, in bytes
pub const MAX_VALUE_SIZE: usize = 4 * 1024 * 1024; // 4 MiB
