//! Redis-backed cache.

use crate::domain::repositories::{CacheBackend, CacheBackendError};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "alias:";

/// Redis cache with a fixed entry TTL.
///
/// Every operation is bounded by `timeout`; an expired operation reports
/// [`CacheBackendError::Timeout`].
pub struct RedisCacheBackend {
    conn: ConnectionManager,
    ttl: Duration,
    timeout: Duration,
}

impl RedisCacheBackend {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheBackendError::Backend`] if the URL is invalid or the
    /// server cannot be reached, and [`CacheBackendError::Timeout`] if the
    /// PING does not complete in time.
    pub async fn connect(
        redis_url: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<Self, CacheBackendError> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheBackendError::Backend(format!("Failed to create Redis client: {}", e))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            CacheBackendError::Backend(format!("Failed to connect to Redis: {}", e))
        })?;

        let backend = Self { conn, ttl, timeout };

        let mut ping = backend.conn.clone();
        backend
            .bounded(async move { ping.ping::<()>().await })
            .await?;

        info!(ttl_secs = ttl.as_secs(), "Connected to Redis cache");
        Ok(backend)
    }

    fn key(alias: &str) -> String {
        format!("{}{}", KEY_PREFIX, alias)
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, CacheBackendError> {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheBackendError::Backend(e.to_string())),
            Err(_) => Err(CacheBackendError::Timeout),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, alias: &str) -> Result<Option<String>, CacheBackendError> {
        let key = Self::key(alias);
        let mut conn = self.conn.clone();

        let cached = self
            .bounded(async move { conn.get::<_, Option<String>>(&key).await })
            .await?;

        debug!(alias, hit = cached.is_some(), "Cache GET");
        Ok(cached)
    }

    async fn set(&self, alias: &str, url: &str) -> Result<(), CacheBackendError> {
        let key = Self::key(alias);
        let mut conn = self.conn.clone();
        let ttl = self.ttl.as_secs();

        self.bounded(async move { conn.set_ex::<_, _, ()>(&key, url, ttl).await })
            .await
            .inspect_err(|e| warn!(alias, error = %e, "Cache SET failed"))?;

        debug!(alias, ttl_secs = ttl, "Cache SET");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.ping::<()>().await })
            .await
            .is_ok()
    }
}
