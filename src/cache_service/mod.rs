//! Remote cache service.
//!
//! A small HTTP service in front of a
//! [`CacheBackend`](crate::domain::repositories::CacheBackend), consumed by
//! [`CacheFallbackStore`](crate::infrastructure::cache::CacheFallbackStore):
//!
//! - `POST /set` - cache an alias
//! - `GET /{alias}` - look up an alias (`204` on miss)
//! - `GET /health` - backend health
//!
//! Error responses use the `application/problem+json` content type.

pub mod dto;
pub mod handlers;

use crate::api::middleware;
use axum::{
    Router,
    routing::{get, post},
};
use handlers::{SharedBackend, get_handler, health_handler, set_handler};

/// Builds the cache service router.
pub fn router(backend: SharedBackend) -> Router {
    let routes = Router::new()
        .route("/set", post(set_handler))
        .route("/health", get(health_handler))
        .route("/{alias}", get(get_handler))
        .with_state(backend);

    middleware::stack(routes)
}
