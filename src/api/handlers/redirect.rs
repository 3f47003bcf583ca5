//! Handler for short link redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use crate::domain::UrlEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects an alias to its URL.
///
/// # Endpoint
///
/// `GET /{alias}`
///
/// # Request Flow
///
/// 1. Resolve the alias through the configured store
/// 2. Publish a `url_access` event (fire-and-forget)
/// 3. Return 302 Found
///
/// # Errors
///
/// - 204 No Content if the alias is unknown
/// - 408 Request Timeout if the cache service timed out
/// - 500 Internal Server Error for storage failures
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.store.resolve_url(&alias).await?;

    debug!(alias = %alias, url = %url, "Resolved alias");

    state
        .events
        .publish(&UrlEvent::accessed(url.as_str(), alias.as_str()))
        .await;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}
