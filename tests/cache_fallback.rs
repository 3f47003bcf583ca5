mod common;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use url_relay::cache_service;
use url_relay::routes::app_router;
use url_relay::domain::repositories::{Closeable, StoreError, UrlStore};
use url_relay::infrastructure::cache::CacheFallbackStore;
use url_relay::infrastructure::persistence::SqliteStore;

async fn fallback_store(
    cache: Arc<common::MemoryCache>,
) -> CacheFallbackStore<SqliteStore> {
    let base = common::spawn_server(cache_service::router(cache)).await;
    CacheFallbackStore::new(&base, common::memory_store().await, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_save_then_resolve_through_cache() {
    let cache = Arc::new(common::MemoryCache::default());
    let store = fallback_store(cache.clone()).await;

    let id = store.save_url("https://example.com", "abc").await.unwrap();
    assert!(!id.is_empty());
    assert_eq!(cache.len(), 1);

    assert_eq!(store.resolve_url("abc").await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_cache_miss_falls_back_to_durable_store() {
    let cache = Arc::new(common::MemoryCache::default());
    let store = fallback_store(cache.clone()).await;

    store.save_url("https://example.com", "abc").await.unwrap();
    cache.evict("abc");

    assert_eq!(store.resolve_url("abc").await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_unknown_alias_is_not_found() {
    let store = fallback_store(Arc::new(common::MemoryCache::default())).await;

    assert!(matches!(
        store.resolve_url("missing").await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn test_duplicate_save_keeps_durable_error() {
    let cache = Arc::new(common::MemoryCache::default());
    let store = fallback_store(cache.clone()).await;

    store.save_url("https://x.com", "dup").await.unwrap();
    let result = store.save_url("https://x.com", "dup").await;

    assert!(matches!(result, Err(StoreError::AlreadyExists)));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_cache_write_failure_after_durable_success() {
    let broken = Router::new()
        .route("/set", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/{alias}", get(|| async { StatusCode::NO_CONTENT }));
    let base = common::spawn_server(broken).await;

    let store =
        CacheFallbackStore::new(&base, common::memory_store().await, Duration::from_secs(5))
            .unwrap();

    let result = store.save_url("https://example.com", "abc").await;
    assert!(matches!(result, Err(StoreError::RemoteStorage(_))));

    // The durable write went through.
    assert_eq!(store.resolve_url("abc").await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_cache_timeout_is_reported_without_fallback() {
    let slow = Router::new().route(
        "/{alias}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "ok": true, "url": "https://late.com" }))
        }),
    );
    let base = common::spawn_server(slow).await;

    let durable = common::memory_store().await;
    durable.save_url("https://example.com", "abc").await.unwrap();

    let store = CacheFallbackStore::new(&base, durable, Duration::from_millis(200)).unwrap();

    assert!(matches!(
        store.resolve_url("abc").await,
        Err(StoreError::Timeout)
    ));
}

#[tokio::test]
async fn test_close_releases_durable_store() {
    let store = fallback_store(Arc::new(common::MemoryCache::default())).await;
    store.save_url("https://example.com", "abc").await.unwrap();

    store.close().await;

    // Cache still answers, the closed durable store is not consulted on a hit.
    assert_eq!(store.resolve_url("abc").await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_api_over_cache_fallback_store() {
    let store: Arc<dyn UrlStore> = Arc::new(fallback_store(Arc::new(common::MemoryCache::default())).await);
    let (state, _writer) = common::create_test_state(store);
    let server = TestServer::new(app_router(state)).unwrap();

    let body = server
        .post("/")
        .json(&json!({ "url": "https://example.com/deep/link" }))
        .await
        .json::<Value>();

    let short_link = body["alias"].as_str().unwrap();
    let alias = short_link.rsplit('/').next().unwrap();

    let response = server.get(&format!("/{}", alias)).await;
    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/deep/link");
}
