//! HTTP handlers of the cache service.

use crate::domain::repositories::{CacheBackend, CacheBackendError};
use super::dto::{CacheResponse, PROBLEM_JSON, SetRequest};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

/// Shared backend handed to every handler.
pub type SharedBackend = Arc<dyn CacheBackend>;

fn problem(status: StatusCode, description: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, PROBLEM_JSON)],
        Json(CacheResponse::error(description)),
    )
        .into_response()
}

fn backend_failure(e: CacheBackendError) -> Response {
    match e {
        CacheBackendError::Timeout => problem(StatusCode::REQUEST_TIMEOUT, "time out on request"),
        CacheBackendError::Backend(message) => {
            error!(error = %message, "Cache backend failure");
            problem(StatusCode::INTERNAL_SERVER_ERROR, "server error")
        }
    }
}

/// Caches an alias.
///
/// # Endpoint
///
/// `POST /set`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "alias": "q1w2e3r4t5y" }
/// ```
///
/// # Response Codes
///
/// - **200 OK**: stored
/// - **400 Bad Request**: empty body, malformed JSON, or blank fields
/// - **408 Request Timeout**: backend did not answer in time
/// - **500 Internal Server Error**: backend failure
pub async fn set_handler(State(backend): State<SharedBackend>, body: Bytes) -> Response {
    if body.is_empty() {
        return problem(StatusCode::BAD_REQUEST, "empty request body");
    }

    let request: SetRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Undecodable set request");
            return problem(StatusCode::BAD_REQUEST, "error decoding request content");
        }
    };

    if request.url.trim().is_empty() || request.alias.trim().is_empty() {
        return problem(StatusCode::BAD_REQUEST, "url or alias is empty");
    }

    match backend.set(&request.alias, &request.url).await {
        Ok(()) => (StatusCode::OK, Json(CacheResponse::ok())).into_response(),
        Err(e) => backend_failure(e),
    }
}

/// Looks up a cached alias.
///
/// # Endpoint
///
/// `GET /{alias}`
///
/// # Response Codes
///
/// - **200 OK**: hit, body `{"ok": true, "url": "..."}`
/// - **204 No Content**: miss
/// - **408 Request Timeout**: backend did not answer in time
/// - **500 Internal Server Error**: backend failure
pub async fn get_handler(
    State(backend): State<SharedBackend>,
    Path(alias): Path<String>,
) -> Response {
    match backend.get(&alias).await {
        Ok(Some(url)) => (StatusCode::OK, Json(CacheResponse::hit(url))).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => backend_failure(e),
    }
}

/// `GET /health`: 200 when the backend answers, 503 otherwise.
pub async fn health_handler(State(backend): State<SharedBackend>) -> Response {
    if backend.health_check().await {
        (StatusCode::OK, Json(CacheResponse::ok())).into_response()
    } else {
        problem(StatusCode::SERVICE_UNAVAILABLE, "cache backend unavailable")
    }
}
