//! HTTP-facing error type of the shortener API.

use crate::cache_service::dto::PROBLEM_JSON;
use crate::domain::repositories::StoreError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    description: String,
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Timeout { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn timeout(message: impl Into<String>, details: Value) -> Self {
        Self::Timeout {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            // An unknown alias is an empty success, not an error page.
            AppError::NotFound { message, details } => {
                tracing::debug!(%message, %details, "Not found");
                return StatusCode::NO_CONTENT.into_response();
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Timeout { message, details } => {
                (StatusCode::REQUEST_TIMEOUT, "timeout", message, details)
            }
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            ok: false,
            description: message.clone(),
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, [(header::CONTENT_TYPE, PROBLEM_JSON)], Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::not_found("url not found", json!({})),
            StoreError::AlreadyExists => {
                AppError::conflict("url with alias is already added", json!({}))
            }
            StoreError::UrlEmpty => AppError::bad_request("url is empty", json!({})),
            StoreError::AliasEmpty => AppError::bad_request("alias is empty", json!({})),
            StoreError::Timeout => AppError::timeout("time out on request", json!({})),
            StoreError::RemoteStorage(reason)
            | StoreError::Server(reason)
            | StoreError::Request(reason) => {
                tracing::error!(error = %reason, "Remote storage failure");
                AppError::internal("remote storage error", json!({}))
            }
            StoreError::Database(e) => {
                tracing::error!(error = %e, "Database failure");
                AppError::internal("server error", json!({}))
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        let errors = e.field_errors();
        let fields: Vec<&str> = errors.keys().map(|k| k.as_ref()).collect();
        AppError::bad_request("invalid url", json!({ "fields": fields }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        let message = match e {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                "error decoding request content"
            }
            JsonRejection::MissingJsonContentType(_) => "expected application/json body",
            _ => "invalid request body",
        };
        AppError::bad_request(message, json!({ "reason": e.body_text() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_empty_no_content() {
        let response = AppError::from(StoreError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_store_errors_map_to_statuses() {
        let cases = [
            (StoreError::AlreadyExists, StatusCode::CONFLICT),
            (StoreError::UrlEmpty, StatusCode::BAD_REQUEST),
            (StoreError::Timeout, StatusCode::REQUEST_TIMEOUT),
            (
                StoreError::RemoteStorage("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Request("refused".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            let response = AppError::from(error).into_response();
            assert_eq!(response.status(), status);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                PROBLEM_JSON
            );
        }
    }

    #[test]
    fn test_validation_errors_list_fields() {
        use crate::api::dto::shorten::ShortenRequest;
        use validator::Validate;

        let request = ShortenRequest {
            url: "not a url".to_string(),
        };
        let error = AppError::from(request.validate().unwrap_err());

        match error {
            AppError::Validation { message, details } => {
                assert_eq!(message, "invalid url");
                assert_eq!(details["fields"], json!(["url"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
