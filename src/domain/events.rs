//! Events published to the broker by the shortener API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event about a stored alias.
///
/// Serialized as JSON with a `type` tag:
///
/// ```json
/// {"type":"url_add","source":"https://example.com","alias":"q1w2e3r4t5y","at":"2026-01-01T00:00:00Z"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UrlEvent {
    /// A new alias was saved.
    #[serde(rename = "url_add")]
    Added {
        source: String,
        alias: String,
        at: DateTime<Utc>,
    },
    /// An alias was resolved by a client.
    #[serde(rename = "url_access")]
    Accessed {
        url: String,
        alias: String,
        at: DateTime<Utc>,
    },
}

impl UrlEvent {
    pub fn added(source: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Added {
            source: source.into(),
            alias: alias.into(),
            at: Utc::now(),
        }
    }

    pub fn accessed(url: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Accessed {
            url: url.into(),
            alias: alias.into(),
            at: Utc::now(),
        }
    }

    /// The wire tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "url_add",
            Self::Accessed { .. } => "url_access",
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            Self::Added { alias, .. } | Self::Accessed { alias, .. } => alias,
        }
    }
}
