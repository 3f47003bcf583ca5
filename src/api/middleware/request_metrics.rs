//! HTTP request metrics.
//!
//! - `http_requests_total{path,method,status,content_type}` counter
//! - `http_request_duration_seconds{path,method,status}` histogram
//!
//! `path` is the route template (`/{alias}`), never the raw URI.

use axum::extract::{MatchedPath, Request};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::time::{Duration, Instant};

/// Label used for requests that matched no route.
const UNMATCHED: &str = "unmatched";

pub async fn track_metrics(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED.to_owned());
    let method = request.method().to_string();

    let started = Instant::now();
    let response = next.run(request).await;

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    record_request(
        path,
        method,
        response.status().as_u16(),
        content_type,
        started.elapsed(),
    );

    response
}

pub(crate) fn record_request(
    path: String,
    method: String,
    status: u16,
    content_type: String,
    elapsed: Duration,
) {
    let status = status.to_string();

    metrics::histogram!(
        "http_request_duration_seconds",
        "path" => path.clone(),
        "method" => method.clone(),
        "status" => status.clone()
    )
    .record(elapsed.as_secs_f64());

    metrics::counter!(
        "http_requests_total",
        "path" => path,
        "method" => method,
        "status" => status,
        "content_type" => content_type
    )
    .increment(1);
}
