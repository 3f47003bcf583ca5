//! Request ID middleware.
//!
//! Every request carries an `X-Request-ID`. A client-supplied id is kept,
//! otherwise a UUID v4 is generated. The id is:
//!
//! - set on the request headers and stored as a [`RequestId`] extension
//! - attached to a `request_id` span wrapping the rest of the stack
//! - echoed on the response headers

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request id available to handlers through `Extension<RequestId>`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn incoming_id(request: &Request) -> Option<HeaderValue> {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .filter(|value| !value.is_empty() && value.len() <= 128 && value.to_str().is_ok())
        .cloned()
}

pub async fn add_request_id(mut request: Request, next: Next) -> Response {
    let value = match incoming_id(&request) {
        Some(value) => value,
        None => match HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            Ok(value) => value,
            Err(_) => return next.run(request).await,
        },
    };
    let request_id = value.to_str().unwrap_or_default().to_string();

    request.headers_mut().insert(X_REQUEST_ID, value.clone());
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request_id", id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    response.headers_mut().insert(X_REQUEST_ID, value);
    response
}
