mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use std::sync::Arc;
use url_relay::routes::app_router;
use url_relay::domain::repositories::UrlStore;

#[tokio::test]
async fn test_redirect_success() {
    let store = Arc::new(common::memory_store().await);
    store
        .save_url("https://example.com/target", "redirect1")
        .await
        .unwrap();

    let (state, writer) = common::create_test_state(store);
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server.get("/redirect1").await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");

    let events = writer.wait_for(1).await;
    assert_eq!(events[0]["type"], "url_access");
    assert_eq!(events[0]["url"], "https://example.com/target");
    assert_eq!(events[0]["alias"], "redirect1");
}

#[tokio::test]
async fn test_redirect_not_found_is_no_content() {
    let (state, writer) = common::create_test_state(Arc::new(common::memory_store().await));
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server.get("/nonexistent").await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.as_bytes().is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(writer.events().is_empty());
}
