//! Recency Cache - A bounded in-process key/value cache engine
//!
//! Provides LRU or FIFO eviction, lazy per-entry TTL expiration and
//! hit/miss/eviction accounting, plus memoization helpers, an optional
//! background expiry sweeper and a small HTTP front-end.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheEntry, CacheStats, EvictionPolicy, SharedCache};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
pub use memo::{memo_key, Memoizer};
pub use tasks::spawn_cleanup_task;
