use std::sync::Arc;

use crate::domain::AliasGenerator;
use crate::mq::ProducerWorker;
use crate::domain::repositories::UrlStore;

/// Shared state of the shortener API.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UrlStore>,
    pub events: Arc<ProducerWorker>,
    pub aliases: Arc<dyn AliasGenerator>,
    /// Prefix of returned short links, without trailing slash.
    pub base_host: Arc<str>,
    /// Reported by the health endpoint.
    pub store_kind: &'static str,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UrlStore>,
        events: Arc<ProducerWorker>,
        aliases: Arc<dyn AliasGenerator>,
        base_host: &str,
        store_kind: &'static str,
    ) -> Self {
        Self {
            store,
            events,
            aliases,
            base_host: Arc::from(base_host.trim_end_matches('/')),
            store_kind,
        }
    }

    /// Full short link for `alias`.
    pub fn short_link(&self, alias: &str) -> String {
        format!("{}/{}", self.base_host, alias)
    }
}
