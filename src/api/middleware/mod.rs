//! HTTP middleware shared by the shortener API and the cache service.
//!
//! Layers from outermost to innermost:
//!
//! 1. [`request_id`] - `X-Request-ID` tagging and log correlation
//! 2. [`tracing`] - request spans and response logs
//! 3. [`request_metrics`] - request counter and latency histogram
//! 4. `CatchPanicLayer` - a panicking handler becomes a `500`

pub mod request_id;
pub mod request_metrics;
pub mod tracing;

use axum::Router;
use axum::middleware::from_fn;
use tower_http::catch_panic::CatchPanicLayer;

/// Wraps a fully built router in the common layer stack.
pub fn stack(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(from_fn(request_metrics::track_metrics))
        .layer(self::tracing::layer())
        .layer(from_fn(request_id::add_request_id))
}
