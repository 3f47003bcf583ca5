use crate::domain::repositories::{CacheBackend, CacheBackendError};
use async_trait::async_trait;
use tracing::debug;

/// Cache that never holds anything.
///
/// Every lookup is a miss and every write succeeds, so clients of the cache
/// service always fall through to their durable store.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, _alias: &str) -> Result<Option<String>, CacheBackendError> {
        Ok(None)
    }

    async fn set(&self, _alias: &str, _url: &str) -> Result<(), CacheBackendError> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
