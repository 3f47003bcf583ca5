//! Wire types shared by the cache service and its HTTP client.

use serde::{Deserialize, Serialize};

/// Content type of error payloads.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Body of `POST /set`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alias: String,
}

/// Body of every cache service response.
///
/// `url` is present on a lookup hit, `description` on failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CacheResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            description: None,
            url: None,
        }
    }

    pub fn hit(url: String) -> Self {
        Self {
            url: Some(url),
            ..Self::ok()
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            ok: false,
            description: Some(description.into()),
            url: None,
        }
    }
}
