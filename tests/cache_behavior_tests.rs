//! Engine Behaviour Tests
//!
//! Exercises the cache engine through its public API only.

use std::thread::sleep;
use std::time::Duration;

use recency_cache::{Cache, CacheConfig, CacheError, EvictionPolicy};

fn cache(max_size: usize, lru: bool) -> Cache<&'static str, i32> {
    Cache::new(CacheConfig::new().max_size(max_size).lru(lru)).unwrap()
}

fn sorted(mut keys: Vec<&'static str>) -> Vec<&'static str> {
    keys.sort_unstable();
    keys
}

// == Eviction Policy ==

#[test]
fn lru_evicts_least_recently_used() {
    let mut cache = cache(2, true);
    assert_eq!(cache.policy(), EvictionPolicy::Lru);

    cache.set("a", 1, None);
    cache.set("b", 2, None);
    assert_eq!(cache.get("a"), Some(1));
    cache.set("c", 3, None);

    assert_eq!(cache.get("b"), None);
    assert_eq!(sorted(cache.keys()), vec!["a", "c"]);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn fifo_evicts_oldest_insertion() {
    let mut cache = cache(2, false);
    assert_eq!(cache.policy(), EvictionPolicy::Fifo);

    cache.set("a", 1, None);
    cache.set("b", 2, None);
    assert_eq!(cache.get("a"), Some(1));
    cache.set("c", 3, None);

    assert_eq!(cache.get("a"), None);
    assert_eq!(sorted(cache.keys()), vec!["b", "c"]);
}

#[test]
fn size_never_exceeds_capacity() {
    let mut cache = cache(3, true);
    for i in 0..50 {
        let key: &'static str = Box::leak(format!("k{}", i).into_boxed_str());
        cache.set(key, i, None);
        assert!(cache.size() <= 3);
    }
    assert_eq!(cache.stats().evictions, 47);
}

// == Expiration ==

#[test]
fn ttl_expiry_is_a_miss_not_an_eviction() {
    let mut cache = cache(8, true);
    cache.set("k", 1, Some(Duration::from_millis(10)));

    assert_eq!(cache.get("k"), Some(1));
    sleep(Duration::from_millis(20));

    assert_eq!(cache.get("k"), None);
    assert!(!cache.has("k"));

    let stats = cache.stats();
    assert_eq!(stats.evictions, 0);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.expirations, 1);
}

#[test]
fn bulk_accessors_never_report_stale_entries() {
    let mut cache = cache(8, false);
    cache.set("stale", 1, Some(Duration::from_millis(10)));
    cache.set("fresh", 2, None);
    sleep(Duration::from_millis(20));

    assert_eq!(cache.keys(), vec!["fresh"]);
    assert_eq!(cache.values(), vec![2]);
    assert_eq!(cache.entries(), vec![("fresh", 2)]);
    assert_eq!(cache.stats().size, 1);
}

#[test]
fn zero_ttl_never_expires() {
    let mut cache: Cache<&str, i32> =
        Cache::new(CacheConfig::new().ttl(Duration::from_millis(5))).unwrap();
    cache.set("pinned", 1, Some(Duration::ZERO));
    sleep(Duration::from_millis(15));

    assert_eq!(cache.get("pinned"), Some(1));
    assert!(cache.peek_entry("pinned").unwrap().expires_at.is_none());
}

// == Removal Paths ==

#[test]
fn deleting_every_key_empties_the_cache() {
    let mut cache = cache(4, true);
    for (i, key) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
        cache.set(key, i as i32, None);
    }
    cache.get("d");

    for key in cache.keys() {
        assert!(cache.delete(key));
    }
    assert_eq!(cache.size(), 0);
    assert!(cache.is_empty());
    assert!(cache.keys().is_empty());
}

#[test]
fn delete_and_clear_on_absent_data_are_noops() {
    let mut cache = cache(4, true);
    assert!(!cache.delete("ghost"));
    cache.clear();
    assert_eq!(cache.size(), 0);
}

#[test]
fn clear_drops_every_key() {
    let mut cache = cache(4, true);
    cache.set("a", 1, None);
    cache.set("b", 2, None);

    cache.clear();
    assert_eq!(cache.stats().size, 0);
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
}

// == Round Trip & Configuration ==

#[test]
fn round_trip_on_unbounded_cache() {
    let mut cache: Cache<String, Vec<u8>> = Cache::default();
    cache.set("bytes".to_string(), vec![1, 2, 3], None);

    assert_eq!(cache.get("bytes"), Some(vec![1, 2, 3]));
    assert_eq!(cache.capacity(), None);
}

#[test]
fn zero_capacity_names_the_field() {
    let err = Cache::<String, String>::new(CacheConfig::new().max_size(0)).unwrap_err();
    match err {
        CacheError::Configuration { field, .. } => assert_eq!(field, "max_size"),
        other => panic!("unexpected error: {other}"),
    }
}
