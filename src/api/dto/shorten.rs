//! DTOs for the shorten endpoint.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Must be an absolute `http` or `https` URL with a host.
    #[validate(
        url(message = "Invalid URL format"),
        custom(function = "validate_web_url")
    )]
    #[serde(default)]
    pub url: String,
}

fn validate_web_url(value: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value).map_err(|_| ValidationError::new("url"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new("scheme").with_message("Only http and https URLs".into()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::new("host").with_message("URL must have a host".into()));
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub ok: bool,
    /// Full short link, `<base_host>/<alias>`.
    pub alias: String,
}
