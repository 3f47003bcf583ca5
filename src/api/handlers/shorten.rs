//! Handler for the shorten endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::{error, info};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::domain::UrlEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::repositories::StoreError;

/// Stores a URL under a freshly generated alias.
///
/// # Endpoint
///
/// `POST /`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "ok": true, "alias": "http://localhost:3000/q1w2e3r4t5y" }
/// ```
///
/// A `url_add` event is published after a successful save.
///
/// # Errors
///
/// - 400 Bad Request for a missing, malformed or non-web URL
/// - 408 Request Timeout if the cache service timed out
/// - 409 Conflict if the alias is already taken
/// - 500 Internal Server Error for storage failures
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let alias = state.aliases.generate(&request.url)?;

    let id = state
        .store
        .save_url(&request.url, &alias)
        .await
        .inspect_err(|e| match e {
            StoreError::AlreadyExists | StoreError::UrlEmpty | StoreError::AliasEmpty => {}
            e => error!(alias = %alias, error = %e, "Save url error"),
        })?;

    info!(alias = %alias, id = %id, url = %request.url, "Added alias to url");

    state
        .events
        .publish(&UrlEvent::added(request.url.as_str(), alias.as_str()))
        .await;

    Ok(Json(ShortenResponse {
        ok: true,
        alias: state.short_link(&alias),
    }))
}
