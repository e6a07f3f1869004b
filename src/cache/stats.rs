//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Number of lookups that returned a live value
    pub hits: u64,
    /// Number of lookups that found nothing or only a stale entry
    pub misses: u64,
    /// Number of entries dropped by invalidation or clear
    pub invalidated: u64,
    /// Number of expired entries removed by the cleanup sweep
    pub expired_removed: u64,
    /// Current number of entries in the cache (stale ones included)
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
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

    // == Record Invalidation ==
    /// Adds `count` entries to the invalidation counter.
    pub fn record_invalidated(&mut self, count: usize) {
        self.invalidated += count as u64;
    }

    pub fn record_expired_removed(&mut self, count: usize) {
        self.expired_removed += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
