//! Cache Policy Module
//!
//! Eviction victim selection and lazy TTL expiration rules.

use std::fmt;
use std::time::{Duration, Instant};

use super::entry::CacheEntry;

// == Eviction Policy ==
/// Decides how accesses reorder the recency list.
///
/// Both policies evict from the list tail. They differ only in whether a
/// touch moves the node to the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Least recently used: reads and overwrites refresh position
    Lru,
    /// First in, first out: position is fixed at insertion
    #[default]
    Fifo,
}

impl EvictionPolicy {
    /// Maps the `lru` configuration flag to a policy.
    pub fn from_lru_flag(lru: bool) -> Self {
        if lru {
            Self::Lru
        } else {
            Self::Fifo
        }
    }

    /// Returns true if an access should move the node to the head.
    pub fn touches_on_access(self) -> bool {
        matches!(self, Self::Lru)
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => f.write_str("lru"),
            Self::Fifo => f.write_str("fifo"),
        }
    }
}

// == Expiration Policy ==
/// Lazy TTL rules applied whenever an entry is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpirationPolicy {
    default_ttl: Option<Duration>,
}

impl ExpirationPolicy {
    /// Creates a policy with the given default TTL (None or zero = never expire).
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self { default_ttl }
    }

    /// Computes the deadline for an entry written at `now`.
    ///
    /// An explicit TTL overrides the default; a zero TTL never expires, even
    /// when a default is configured. A deadline past the representable range
    /// of `Instant` is treated as never.
    pub fn deadline(&self, now: Instant, ttl: Option<Duration>) -> Option<Instant> {
        ttl.or(self.default_ttl)
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| now.checked_add(ttl))
    }

    /// Returns true if the entry is stale at `now`.
    pub fn is_expired<V>(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        entry.is_expired_at(now)
    }
}
