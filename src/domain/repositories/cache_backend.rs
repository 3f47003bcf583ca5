//! Cache backend trait and error types.

use async_trait::async_trait;

/// Errors reported by a [`CacheBackend`].
#[derive(Debug, thiserror::Error)]
pub enum CacheBackendError {
    /// The backend did not answer within the configured timeout.
    #[error("cache operation timed out")]
    Timeout,
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Key-value storage behind the cache service.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCacheBackend`] - Redis with a fixed TTL
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the URL cached under `alias`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on hit
    /// - `Ok(None)` on miss
    async fn get(&self, alias: &str) -> Result<Option<String>, CacheBackendError>;

    /// Caches `url` under `alias`, replacing any previous entry.
    async fn set(&self, alias: &str, url: &str) -> Result<(), CacheBackendError>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
