//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Running counters plus a size snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries removed to make room for new keys
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Live entries at the time of the snapshot
    pub size: usize,
    /// Configured capacity, None = unbounded
    pub max_size: Option<usize>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
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

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Zeroes every counter, keeping size and capacity.
    pub(crate) fn reset_counters(&mut self) {
        *self = Self {
            size: self.size,
            max_size: self.max_size,
            ..Self::default()
        };
    }
}
