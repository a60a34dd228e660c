//! Cache Statistics Module
//!
//! Point-in-time view of the store plus cumulative hit, miss, eviction and
//! reclaim counters.

use serde::Serialize;

// == Cache Counters ==
/// Cumulative counters maintained by the store.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub reclaimed: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_reclaimed(&mut self, count: usize) {
        self.reclaimed += count as u64;
    }
}

// == Cache Stats ==
/// Snapshot returned by `CacheStore::stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently held, expired or not
    pub total_entries: usize,
    /// Entries that have not yet expired
    pub live_entries: usize,
    /// Configured maximum number of entries
    pub capacity: usize,
    /// Default TTL in seconds
    pub default_ttl: u64,
    /// Number of `get` calls that returned a value
    pub hits: u64,
    /// Number of `get` calls that found nothing servable
    pub misses: u64,
    /// Entries removed by capacity eviction
    pub evictions: u64,
    /// Expired entries removed by the reclaimer
    pub reclaimed: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
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
}
