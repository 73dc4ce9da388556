//! Cache Module
//!
//! Provides the byte-bounded LRU stores backing the hot and local tiers.

mod lru;
mod stats;

#[cfg(test)]
mod property_tests;

use bytes::Bytes;

// Re-export public types
pub use lru::LruStore;
pub use stats::{CacheStats, LookupStats};

// == Store Trait ==
/// A synchronous in-memory cache tier.
///
/// A miss is `None`, never an error. Implementations synchronize internally.
pub trait Store: Send + Sync {
    /// Returns the cached value for `key`, if any.
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Caches `value` under `key`. Population is best-effort; empty values are never cached.
    fn set(&self, key: &str, value: Bytes);

    /// Returns a snapshot of the tier's counters.
    fn stats(&self) -> CacheStats;
}
