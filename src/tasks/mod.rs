//! Background Tasks Module
//!
//! Optional tasks layered on top of the cache engine.
//!
//! # Tasks
//! - Expiry sweep: prunes expired cache entries at a configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
