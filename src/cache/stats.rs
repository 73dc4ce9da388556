//! Cache Statistics Module
//!
//! Tracks store metrics including hits, misses, evictions and occupancy.

use serde::Serialize;

// == Cache Stats ==
/// Tracks store performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries evicted to stay within the byte budget
    pub evictions: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Current footprint (keys + values) in bytes
    pub size_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
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

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Occupancy ==
    /// Updates the entry count and byte footprint.
    pub fn set_occupancy(&mut self, entries: usize, size_bytes: usize) {
        self.total_entries = entries;
        self.size_bytes = size_bytes;
    }
}

// == Lookup Stats ==
/// Counts of completed lookups by the path that answered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    pub hot_cache: u64,
    pub local_cache: u64,
    pub local_get: u64,
    pub peer_cache: u64,
    pub peer_get: u64,
    /// Peer calls that failed and were answered by the origin instead
    pub peer_fallbacks: u64,
    /// Lookups that ended in an error
    pub errors: u64,
}
