//! Cache Entry Module
//!
//! Defines the value-plus-metadata record stored inside every recency list node.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value together with its lifecycle metadata.
///
/// Timestamps are monotonic, so wall-clock adjustments never resurrect or
/// prematurely expire an entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was first inserted
    pub created_at: Instant,
    /// Expiration deadline, None = never expires
    pub expires_at: Option<Instant>,
    /// Number of successful reads
    pub access_count: u64,
    /// Last read or write
    pub last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry observed at `now`.
    pub fn new(value: V, expires_at: Option<Instant>, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            expires_at,
            access_count: 0,
            last_accessed: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale relative to `now`.
    ///
    /// Boundary condition: the entry is still live at exactly `expires_at`
    /// and becomes expired strictly after it.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }

    // == Time To Live ==
    /// Returns the remaining TTL at `now`, or None if the entry never expires.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` once the deadline has passed
    /// - `Some(remaining)` while the entry is live
    /// - `None` if the entry has no deadline
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    // == Access Bookkeeping ==
    pub(crate) fn record_access(&mut self, now: Instant) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = now;
    }

    /// Overwrites the value and deadline in place. Creation time and access
    /// count survive an overwrite.
    pub(crate) fn refresh(&mut self, value: V, expires_at: Option<Instant>, now: Instant) {
        self.value = value;
        self.expires_at = expires_at;
        self.last_accessed = now;
    }
}
