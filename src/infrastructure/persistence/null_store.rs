use crate::domain::repositories::{StoreError, UrlStore};
use async_trait::async_trait;
use tracing::debug;

/// Store that keeps nothing.
///
/// Saves always succeed with id `"0"`, resolves always report
/// [`StoreError::NotFound`]. Useful for running the HTTP surface without a
/// database.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl UrlStore for NullStore {
    async fn save_url(&self, _url: &str, alias: &str) -> Result<String, StoreError> {
        debug!(alias, "NullStore: discarding alias");
        Ok("0".to_string())
    }

    async fn resolve_url(&self, _alias: &str) -> Result<String, StoreError> {
        Err(StoreError::NotFound)
    }
}
