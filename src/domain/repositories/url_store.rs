//! Alias storage contract.
//!
//! [`UrlStore`] has three implementations, chosen when the application is
//! wired together:
//!
//! - [`SqliteStore`](crate::infrastructure::persistence::SqliteStore) -
//!   authoritative durable store
//! - [`CacheFallbackStore`](crate::infrastructure::cache::CacheFallbackStore) -
//!   remote cache service in front of another store
//! - [`NullStore`](crate::infrastructure::persistence::NullStore) - stores nothing
//!
//! Stores that own a resource needing explicit release also implement
//! [`Closeable`].

use async_trait::async_trait;

/// Errors reported by [`UrlStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("url does not exist")]
    NotFound,
    #[error("url already exists")]
    AlreadyExists,
    #[error("url is empty")]
    UrlEmpty,
    #[error("alias is empty")]
    AliasEmpty,
    #[error("time out on request")]
    Timeout,
    /// The remote cache service failed or answered with something unexpected.
    #[error("remote storage error: {0}")]
    RemoteStorage(String),
    /// The remote cache service answered with a problem payload.
    #[error("server error: {0}")]
    Server(String),
    /// The remote cache service could not be reached.
    #[error("error sending request: {0}")]
    Request(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persists and resolves alias to URL mappings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Stores `url` under `alias` and returns the record identifier.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UrlEmpty`] / [`StoreError::AliasEmpty`] on blank input
    /// - [`StoreError::AlreadyExists`] if the pair is already stored
    async fn save_url(&self, url: &str, alias: &str) -> Result<String, StoreError>;

    /// Returns the URL stored under `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the alias is unknown.
    async fn resolve_url(&self, alias: &str) -> Result<String, StoreError>;
}

/// A store holding a resource that must be released on shutdown.
#[async_trait]
pub trait Closeable: Send + Sync {
    async fn close(&self);
}
