//! Memoization Module
//!
//! Wraps a [`Cache`] to memoize async computations keyed by their arguments.
//!
//! Concurrent callers for the same key share one in-flight computation: the
//! cache stores a `Shared` future rather than a finished value. A failed
//! computation is invalidated as soon as it resolves, so the next caller
//! retries instead of observing a cached failure.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheStats};
use crate::config::CacheConfig;
use crate::error::Result;

/// A computation that may still be running, cloneable by every waiter.
type InFlight<V, E> = Shared<BoxFuture<'static, std::result::Result<V, E>>>;

// == Memo Key ==
/// Derives a cache key from a function name and its serialized arguments.
///
/// Arguments that serialize identically map to the same key, e.g.
/// `memo_key("user", &(42, "eu"))` yields `user:[42,"eu"]`.
pub fn memo_key<A>(name: &str, args: &A) -> Result<String>
where
    A: Serialize + ?Sized,
{
    Ok(format!("{}:{}", name, serde_json::to_string(args)?))
}

// == Memoizer ==
/// Async memoizer with in-flight request coalescing.
///
/// Cloning a `Memoizer` yields another handle to the same cache.
pub struct Memoizer<V, E> {
    cache: Arc<Mutex<Cache<String, InFlight<V, E>>>>,
}

impl<V, E> Clone for Memoizer<V, E> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<V, E> Memoizer<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates a memoizer backed by a cache built from `config`.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Ok(Self {
            cache: Arc::new(Mutex::new(Cache::new(config)?)),
        })
    }

    // == Get Or Compute ==
    /// Returns the memoized result for `key`, running `compute` only if no
    /// live or in-flight entry exists.
    pub async fn get_or_compute<F, Fut>(&self, key: String, compute: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>> + Send + 'static,
    {
        let pending = {
            let mut cache = self.cache.lock().await;
            match cache.get(&key) {
                Some(pending) => {
                    debug!(key = %key, "Joining memoized computation");
                    pending
                }
                None => {
                    let pending = compute().boxed().shared();
                    cache.set(key.clone(), pending.clone(), None);
                    pending
                }
            }
        };

        let result = pending.clone().await;

        if result.is_err() {
            let mut cache = self.cache.lock().await;
            let still_cached = cache
                .peek(&key)
                .is_some_and(|cached| cached.ptr_eq(&pending));
            if still_cached {
                cache.delete(&key);
                warn!(key = %key, "Memoized computation failed; entry invalidated");
            }
        }

        result
    }

    // == Invalidate ==
    /// Drops the memoized entry for `key`, returning whether one existed.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.lock().await.delete(key)
    }

    /// Returns the underlying cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn memoizer() -> Memoizer<u64, String> {
        Memoizer::new(CacheConfig::new().max_size(16).lru(true)).unwrap()
    }

    #[test]
    fn test_memo_key_is_stable() {
        let a = memo_key("user", &(42, "eu")).unwrap();
        let b = memo_key("user", &(42, "eu")).unwrap();
        let c = memo_key("user", &(43, "eu")).unwrap();

        assert_eq!(a, r#"user:[42,"eu"]"#);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result: Result<Memoizer<u64, String>> = Memoizer::new(CacheConfig::new().max_size(0));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_result_is_memoized() {
        let memo = memoizer();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let value = memo
                .get_or_compute("answer".to_string(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value, Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = memo.stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let memo = memoizer();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let memo = memo.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                memo.get_or_compute("slow".to_string(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok(7)
                })
                .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_invalidated_and_retried() {
        let memo = memoizer();

        let failed = memo
            .get_or_compute("flaky".to_string(), || async { Err("down".to_string()) })
            .await;
        assert_eq!(failed, Err("down".to_string()));

        let recovered = memo
            .get_or_compute("flaky".to_string(), || async { Ok(1) })
            .await;
        assert_eq!(recovered, Ok(1));
    }

    #[test]
    fn test_invalidate() {
        tokio_test::block_on(async {
            let memo = memoizer();
            memo.get_or_compute("k".to_string(), || async { Ok(1) })
                .await
                .unwrap();

            assert!(memo.invalidate("k").await);
            assert!(!memo.invalidate("k").await);

            let value = memo
                .get_or_compute("k".to_string(), || async { Ok(2) })
                .await;
            assert_eq!(value, Ok(2));
        });
    }
}
