//! Caching on both sides of the remote cache service.
//!
//! - [`CacheFallbackStore`] - client side, a [`UrlStore`] that asks the cache
//!   service before its inner store
//! - [`RedisCacheBackend`] / [`NullCache`] - service side backends
//!
//! [`UrlStore`]: crate::domain::repositories::UrlStore

mod cache_fallback;
mod null_cache;
mod redis_backend;

pub use cache_fallback::CacheFallbackStore;
pub use null_cache::NullCache;
pub use redis_backend::RedisCacheBackend;
