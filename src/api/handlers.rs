//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.
//!
//! Every handler takes the write lock: even reads may reorder the recency
//! list or sweep expired entries.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Cache, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HasResponse, HealthResponse, KeysResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lock-wrapped cache engine
    pub cache: SharedCache<String, String>,
}

impl AppState {
    /// Creates a new AppState owning the given cache.
    pub fn new(cache: Cache<String, String>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from server configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Cache::new(config.cache.clone())?))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair with an optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, ttl);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a live value; absent and expired keys are 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let (value, ttl_remaining) = state
        .cache
        .write()
        .await
        .get_with_ttl(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let ttl_remaining_ms = ttl_remaining.map(|ttl| ttl.as_millis() as u64);

    Ok(Json(GetResponse::new(key, value, ttl_remaining_ms)))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let exists = state.cache.write().await.has(&key);
    Json(HasResponse { key, exists })
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    if !cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    let keys = state.cache.write().await.keys();
    Json(KeysResponse { keys })
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.write().await.clear();
    Json(ClearResponse::new())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.write().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
