//! Cache Store Module
//!
//! Main cache engine combining a hash index with an intrusive recency list,
//! lazy TTL expiration and capacity eviction.
//!
//! # Concurrency
//! `Cache` performs no internal locking and every operation takes `&mut self`,
//! including reads, because lazy expiry and LRU reordering mutate state.
//! Callers sharing a cache across tasks or threads must wrap it themselves,
//! e.g. in a [`SharedCache`](super::SharedCache).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

use super::entry::CacheEntry;
use super::list::{NodeId, RecencyList};
use super::policy::{EvictionPolicy, ExpirationPolicy};
use super::stats::CacheStats;
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache ==
/// Bounded key/value cache with LRU or FIFO eviction and per-entry TTL.
///
/// `get`, `set`, `delete` and `has` are O(1) amortized. The bulk accessors
/// (`size`, `keys`, `values`, `entries`, `stats`) first sweep expired entries,
/// which costs O(n).
#[derive(Debug)]
pub struct Cache<K, V> {
    /// Key -> node handle; never owns a node
    index: HashMap<K, NodeId>,
    /// Owns every node, head = most recent
    list: RecencyList<K, V>,
    /// Running counters
    stats: CacheStats,
    eviction: EvictionPolicy,
    expiration: ExpirationPolicy,
    config: CacheConfig,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a cache from a validated configuration.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` when `max_size` is zero.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Creates an unbounded FIFO cache whose entries never expire.
    pub fn unbounded() -> Self {
        Self::from_valid_config(CacheConfig::default())
    }

    fn from_valid_config(config: CacheConfig) -> Self {
        Self {
            index: HashMap::new(),
            list: RecencyList::new(),
            stats: CacheStats::new(config.max_size),
            eviction: config.policy(),
            expiration: ExpirationPolicy::new(config.ttl),
            config,
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous value for the key.
    ///
    /// `ttl` of None applies the configured default; `Some(Duration::ZERO)`
    /// never expires. Overwriting a live key updates it in place and never
    /// evicts. Inserting a new key into a full cache evicts the tail first.
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let now = Instant::now();
        let expires_at = self.expiration.deadline(now, ttl);

        if let Some(id) = self.live_id(&key, now) {
            if let Some(entry) = self.list.entry_mut(id) {
                entry.refresh(value, expires_at, now);
            }
            self.touch(id);
            return;
        }

        if self
            .config
            .max_size
            .is_some_and(|max_size| self.index.len() >= max_size)
        {
            self.evict_one(now);
        }

        let id = self
            .list
            .push_front(key.clone(), CacheEntry::new(value, expires_at, now));
        self.index.insert(key, id);
    }

    // == Delete ==
    /// Removes a key, returning whether it was present.
    ///
    /// An entry that had already expired but was not yet swept still counts
    /// as present here; it is unlinked either way.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key).copied() {
            Some(id) => self.remove_node(id).is_some(),
            None => false,
        }
    }

    // == Has ==
    /// Returns true if the key holds a live entry.
    ///
    /// Does not reorder the list or touch hit/miss counters. An expired entry
    /// found here is removed.
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_id(key, Instant::now()).is_some()
    }

    // == Peek ==
    /// Borrows a live value without counting a hit or refreshing recency.
    pub fn peek<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek_entry(key).map(|entry| &entry.value)
    }

    /// Borrows a live entry with its metadata, without touching it.
    pub fn peek_entry<Q>(&mut self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.live_id(key, Instant::now())?;
        self.list.entry(id)
    }

    // == Clear ==
    /// Removes every entry. Counters are kept; see [`Cache::reset_stats`].
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    // == Prune Expired ==
    /// Removes every expired entry and returns how many were dropped.
    ///
    /// O(n) in the number of entries.
    pub fn prune_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<NodeId> = self
            .list
            .iter()
            .filter(|(_, _, entry)| self.expiration.is_expired(*entry, now))
            .map(|(id, _, _)| id)
            .collect();

        let mut removed = 0;
        for id in expired {
            if self.remove_node(id).is_some() {
                self.stats.record_expiration();
                removed += 1;
            }
        }
        removed
    }

    // == Size ==
    /// Returns the number of live entries after sweeping expired ones.
    pub fn size(&mut self) -> usize {
        self.prune_expired();
        self.index.len()
    }

    /// Returns true if no live entries remain.
    pub fn is_empty(&mut self) -> bool {
        self.size() == 0
    }

    // == Keys ==
    /// Snapshot of live keys, most recent first.
    pub fn keys(&mut self) -> Vec<K> {
        self.prune_expired();
        self.list.iter().map(|(_, key, _)| key.clone()).collect()
    }

    // == Stats ==
    /// Returns a snapshot of the counters with the size after a sweep.
    pub fn stats(&mut self) -> CacheStats {
        let size = self.size();
        let mut stats = self.stats.clone();
        stats.set_size(size);
        stats
    }

    /// Zeroes the hit, miss, eviction and expiration counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset_counters();
    }

    // == Configuration Accessors ==
    /// Returns the configured capacity.
    pub fn capacity(&self) -> Option<usize> {
        self.config.max_size
    }

    /// Returns the active eviction policy.
    pub fn policy(&self) -> EvictionPolicy {
        self.eviction
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Internal Helpers ==
    /// Resolves a key to a live node, removing it first if it has expired.
    fn live_id<Q>(&mut self, key: &Q, now: Instant) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.get(key).copied()?;
        let expired = self
            .list
            .entry(id)
            .is_some_and(|entry| self.expiration.is_expired(entry, now));

        if expired {
            self.remove_node(id);
            self.stats.record_expiration();
            return None;
        }
        Some(id)
    }

    /// Moves the node to the head when the policy reorders on access.
    fn touch(&mut self, id: NodeId) {
        if self.eviction.touches_on_access() {
            self.list.move_to_front(id);
        }
    }

    /// Removes the tail node to make room for one insertion.
    ///
    /// A tail whose deadline has already passed is counted as an expiration,
    /// not an eviction.
    fn evict_one(&mut self, now: Instant) {
        let Some(victim) = self.list.back() else {
            return;
        };
        let Some((_, entry)) = self.remove_node(victim) else {
            return;
        };
        if self.expiration.is_expired(&entry, now) {
            self.stats.record_expiration();
            return;
        }
        self.stats.record_eviction();
        trace!(
            policy = %self.eviction,
            evictions = self.stats.evictions,
            "evicted tail entry"
        );
    }

    /// The single removal path: unlinks from the list and the index together.
    fn remove_node(&mut self, id: NodeId) -> Option<(K, CacheEntry<V>)> {
        let (key, entry) = self.list.remove(id)?;
        self.index.remove(&key);
        debug_assert_eq!(self.index.len(), self.list.len());
        Some((key, entry))
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// Absent and expired keys count as misses; a hit bumps the entry's
    /// access metadata and, under LRU, moves it to the head.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with_ttl(key).map(|(value, _)| value)
    }

    /// Like [`Cache::get`], also returning the remaining TTL.
    ///
    /// Liveness and the remaining TTL are judged at the same instant, so a
    /// hit on an expiring entry reports `Some(remaining)`, never `None`.
    pub fn get_with_ttl<Q>(&mut self, key: &Q) -> Option<(V, Option<Duration>)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let Some(id) = self.live_id(key, now) else {
            self.stats.record_miss();
            return None;
        };

        let hit = self.list.entry_mut(id).map(|entry| {
            entry.record_access(now);
            (entry.value.clone(), entry.ttl_remaining_at(now))
        });
        self.touch(id);
        self.stats.record_hit();
        hit
    }

    // == Values ==
    /// Snapshot of live values, most recent first.
    pub fn values(&mut self) -> Vec<V> {
        self.prune_expired();
        self.list
            .iter()
            .map(|(_, _, entry)| entry.value.clone())
            .collect()
    }

    // == Entries ==
    /// Snapshot of live `(key, value)` pairs, most recent first.
    pub fn entries(&mut self) -> Vec<(K, V)> {
        self.prune_expired();
        self.list
            .iter()
            .map(|(_, key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Memoization ==
    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// A cached lookup counts as a hit; a computation counts as a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.set(key, value.clone(), None);
        value
    }

    /// Fallible variant of [`Cache::get_or_insert_with`].
    ///
    /// Errors are returned to the caller and never cached, so the next call
    /// retries the computation.
    pub fn try_get_or_insert_with<F, E>(
        &mut self,
        key: K,
        compute: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.set(key, value.clone(), None);
        Ok(value)
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
{
    /// Checks that the index and the list describe the same set of nodes.
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(
            self.index.len(),
            self.list.len(),
            "index and recency list disagree on size"
        );
        assert_eq!(self.list.iter().count(), self.list.len(), "forward walk");
        assert_eq!(self.list.keys_backward().len(), self.list.len(), "backward walk");
        for (key, id) in &self.index {
            assert_eq!(self.list.key(*id), Some(key), "index handle points elsewhere");
        }
        if let Some(max_size) = self.config.max_size {
            assert!(self.index.len() <= max_size, "capacity exceeded");
        }
    }

    /// Physical node count, including expired entries not yet swept.
    pub(crate) fn node_count(&self) -> usize {
        self.list.len()
    }

    /// Keys in list order without sweeping or touching.
    pub(crate) fn order(&self) -> Vec<K> {
        self.list.iter().map(|(_, key, _)| key.clone()).collect()
    }
}
