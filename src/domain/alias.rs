//! Alias generation.

use crate::error::AppError;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use sha2::{Digest, Sha512};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of digest bytes kept; encodes to 11 base64 characters.
const ALIAS_BYTES: usize = 8;

/// Number of random bytes mixed into every digest.
const SALT_BYTES: usize = 8;

/// Produces short aliases for URLs.
#[cfg_attr(test, mockall::automock)]
pub trait AliasGenerator: Send + Sync {
    /// Generates a fresh alias for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if no entropy is available.
    fn generate(&self, url: &str) -> Result<String, AppError>;
}

/// Hashes `url|unix-nanos|random bytes` with SHA-512 and encodes the first
/// [`ALIAS_BYTES`] of the digest as URL-safe base64 without padding.
///
/// Each call owns its hasher and buffers, so the generator is freely shared
/// across tasks.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashAliasGenerator;

impl AliasGenerator for HashAliasGenerator {
    fn generate(&self, url: &str) -> Result<String, AppError> {
        let mut salt = [0u8; SALT_BYTES];
        getrandom::fill(&mut salt).map_err(|e| {
            AppError::internal("Failed to generate alias", json!({ "reason": e.to_string() }))
        })?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut hasher = Sha512::new();
        hasher.update(url.as_bytes());
        hasher.update(b"|");
        hasher.update(nanos.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(salt);
        let digest = hasher.finalize();

        Ok(URL_SAFE_NO_PAD.encode(&digest[..ALIAS_BYTES]))
    }
}
