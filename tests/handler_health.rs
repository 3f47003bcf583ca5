mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use std::sync::Arc;
use url_relay::routes::app_router;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _writer) = common::create_test_state(Arc::new(common::memory_store().await));
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["message"], "sqlite");
    assert_eq!(json["checks"]["events"]["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_degraded_after_publisher_shutdown() {
    let (state, _writer) = common::create_test_state(Arc::new(common::memory_store().await));
    let events = state.events.clone();
    let server = TestServer::new(app_router(state)).unwrap();

    events.shutdown().await;

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["status"], "degraded");
}
