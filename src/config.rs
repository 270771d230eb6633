//! Configuration Module
//!
//! Cache construction options and server configuration loaded from
//! environment variables. Invalid values fail fast instead of being clamped.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};

// == Cache Config ==
/// Construction options for a [`Cache`](crate::cache::Cache).
///
/// Defaults: unbounded, entries never expire, FIFO eviction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries, None = unbounded
    pub max_size: Option<usize>,
    /// Default TTL applied by `set` without an explicit TTL, None = never expire
    pub ttl: Option<Duration>,
    /// Reorder on access (LRU) instead of keeping insertion order (FIFO)
    pub lru: bool,
}

impl CacheConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Sets the default TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Enables or disables LRU reordering.
    pub fn lru(mut self, lru: bool) -> Self {
        self.lru = lru;
        self
    }

    /// Returns the eviction policy implied by the `lru` flag.
    pub fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::from_lru_flag(self.lru)
    }

    /// Rejects a zero capacity.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == Some(0) {
            return Err(CacheError::configuration(
                "max_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// == Raw Cache Options ==
/// Signed, unvalidated cache options as they arrive from external input.
///
/// Converting into [`CacheConfig`] rejects a non-positive `max_size` and a
/// negative `ttl_ms`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCacheOptions {
    pub max_size: Option<i64>,
    pub ttl_ms: Option<i64>,
    pub lru: Option<bool>,
}

impl TryFrom<RawCacheOptions> for CacheConfig {
    type Error = CacheError;

    fn try_from(raw: RawCacheOptions) -> Result<Self> {
        let max_size = match raw.max_size {
            None => None,
            Some(size) if size <= 0 => {
                return Err(CacheError::configuration(
                    "max_size",
                    format!("must be greater than zero, got {}", size),
                ));
            }
            Some(size) => Some(usize::try_from(size).map_err(|_| {
                CacheError::configuration("max_size", format!("{} is not addressable", size))
            })?),
        };

        let ttl = match raw.ttl_ms {
            None => None,
            Some(ms) if ms < 0 => {
                return Err(CacheError::configuration(
                    "ttl",
                    format!("must not be negative, got {}ms", ms),
                ));
            }
            Some(ms) => Some(Duration::from_millis(ms.unsigned_abs())),
        };

        let config = CacheConfig {
            max_size,
            ttl,
            lru: raw.lru.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }
}

// == Server Config ==
/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Options for the served cache
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval
    pub cleanup_interval: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds, 0 = never (default: 300000)
    /// - `LRU_ENABLED` - `true` for LRU, `false` for FIFO (default: true)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL_MS` - Expiry sweep frequency in milliseconds (default: 1000)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let raw = RawCacheOptions {
            max_size: parse_var(&lookup, "MAX_SIZE", "max_size")?.or(Some(1000)),
            ttl_ms: parse_var(&lookup, "DEFAULT_TTL_MS", "ttl")?.or(Some(300_000)),
            lru: parse_var(&lookup, "LRU_ENABLED", "lru")?.or(Some(true)),
        };
        let cache = CacheConfig::try_from(raw)?;

        let server_port =
            parse_var(&lookup, "SERVER_PORT", "server_port")?.unwrap_or(defaults.server_port);

        let cleanup_interval = match parse_var::<u64, _>(
            &lookup,
            "CLEANUP_INTERVAL_MS",
            "cleanup_interval",
        )? {
            None => defaults.cleanup_interval,
            Some(0) => {
                return Err(CacheError::configuration(
                    "cleanup_interval",
                    "must be greater than zero",
                ));
            }
            Some(ms) => Duration::from_millis(ms),
        };

        Ok(Self {
            cache,
            server_port,
            cleanup_interval,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::new()
                .max_size(1000)
                .ttl(Duration::from_secs(300))
                .lru(true),
            server_port: 3000,
            cleanup_interval: Duration::from_secs(1),
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, field: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|err| {
            CacheError::configuration(field, format!("{}={:?}: {}", name, raw, err))
        }),
    }
}
