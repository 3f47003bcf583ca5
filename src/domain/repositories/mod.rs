//! Storage contracts.
//!
//! - [`url_store`] - durable alias storage used by the shortener API
//! - [`cache_backend`] - key-value storage behind the cache service

pub mod cache_backend;
pub mod url_store;

pub use cache_backend::{CacheBackend, CacheBackendError};
pub use url_store::{Closeable, StoreError, UrlStore};

#[cfg(test)]
pub use cache_backend::MockCacheBackend;
#[cfg(test)]
pub use url_store::MockUrlStore;
