//! Expiry Sweep Task
//!
//! Background task that periodically prunes expired cache entries.
//!
//! The engine expires entries lazily on access; this task is an optional
//! layer that bounds how long unread stale entries keep their memory.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that calls `prune_expired` every `interval`.
///
/// The task runs until aborted through the returned handle; it holds the
/// write lock only for the duration of each sweep.
///
/// # Example
/// ```ignore
/// let cache: SharedCache<String, String> = Arc::new(RwLock::new(Cache::unbounded()));
/// let sweeper = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task<K, V>(cache: SharedCache<K, V>, interval: Duration) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.prune_expired()
            };

            if removed > 0 {
                info!(removed, "Expiry sweep removed stale entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn shared() -> SharedCache<String, String> {
        Arc::new(RwLock::new(Cache::unbounded()))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = shared();
        {
            let mut guard = cache.write().await;
            guard.set(
                "expire_soon".to_string(),
                "value".to_string(),
                Some(Duration::from_millis(20)),
            );
        }

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(25));
        tokio::time::sleep(Duration::from_millis(120)).await;

        {
            let mut guard = cache.write().await;
            // Checked before any accessor that sweeps or expires lazily
            assert_eq!(guard.node_count(), 0);
            assert_eq!(guard.prune_expired(), 0);

            let stats = guard.stats();
            assert_eq!(stats.expirations, 1);
            assert_eq!(stats.misses, 0);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = shared();
        {
            let mut guard = cache.write().await;
            guard.set(
                "long_lived".to_string(),
                "value".to_string(),
                Some(Duration::from_secs(3600)),
            );
        }

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(80)).await;

        {
            let mut guard = cache.write().await;
            assert_eq!(guard.node_count(), 1);
            assert_eq!(guard.get("long_lived"), Some("value".to_string()));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(shared(), Duration::from_secs(1));

        handle.abort();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
