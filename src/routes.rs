//! Top-level router of the shortener API.
//!
//! # Route Structure
//!
//! - `POST /`         - Shorten a URL
//! - `GET  /health`   - Health check: store kind, event publisher
//! - `GET  /{alias}`  - Short link redirect
//!
//! # Middleware
//!
//! - **Request ID** - `X-Request-ID` on every request and response
//! - **Tracing** - Structured request/response logging
//! - **Metrics** - Request counter and latency histogram per route
//! - **Panic recovery** - A panicking handler becomes a 500 response

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::api::middleware;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", post(shorten_handler))
        .route("/health", get(health_handler))
        .route("/{alias}", get(redirect_handler))
        .with_state(state);

    middleware::stack(routes)
}
