//! Live Server Smoke Test
//!
//! Binds the router to an ephemeral port and talks to it over real HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use recency_cache::{api::create_router, spawn_cleanup_task, AppState, Cache, CacheConfig};
use serde_json::{json, Value};

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_round_trip_over_http() {
    let state = AppState::new(Cache::new(CacheConfig::new().max_size(10).lru(true)).unwrap());
    let cache = state.cache.clone();
    let sweeper = spawn_cleanup_task(cache.clone(), Duration::from_millis(20));
    let addr = spawn_server(state).await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("http://{}/set", addr))
        .json(&json!({"key": "greeting", "value": "hello"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: Value = client
        .get(format!("http://{}/get/greeting", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["value"], "hello");

    client
        .put(format!("http://{}/set", addr))
        .json(&json!({"key": "fleeting", "value": "bye", "ttl_ms": 10}))
        .send()
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Nothing left for a manual sweep: the background task already ran
    assert_eq!(cache.write().await.prune_expired(), 0);

    let stats: Value = client
        .get(format!("http://{}/stats", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["size"], 1);
    assert_eq!(stats["expirations"], 1);
    assert_eq!(stats["hits"], 1);

    sweeper.abort();
}
