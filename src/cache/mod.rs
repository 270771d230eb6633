//! Cache Module
//!
//! Provides a generic in-memory cache with TTL expiration and LRU or FIFO eviction.

mod entry;
mod list;
mod policy;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use policy::{EvictionPolicy, ExpirationPolicy};
pub use stats::CacheStats;
pub use store::Cache;

/// A cache shared across tasks.
///
/// `Cache` itself never locks; this alias is the caller-side synchronization
/// used by the HTTP front-end and the background sweeper.
pub type SharedCache<K, V> = Arc<RwLock<Cache<K, V>>>;
