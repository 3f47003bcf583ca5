//! Store that consults the remote cache service before an inner store.

use crate::domain::repositories::{Closeable, StoreError, UrlStore};
use crate::cache_service::dto::{CacheResponse, PROBLEM_JSON, SetRequest};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Write-through / read-through proxy for the remote cache service.
///
/// # Save
///
/// The inner store is written first and is authoritative: if it fails, its
/// error is returned and the cache is not touched. The pair is then pushed to
/// the cache service. A cache failure at that point is reported as
/// [`StoreError::RemoteStorage`], [`StoreError::Server`] or
/// [`StoreError::Timeout`] even though the inner write already succeeded.
///
/// # Resolve
///
/// A cache hit is returned without touching the inner store. Only a clean miss
/// (`204 No Content`) falls through to the inner store; timeouts and other
/// cache failures are returned as errors.
pub struct CacheFallbackStore<S> {
    inner: S,
    base_url: Url,
    client: Client,
}

impl<S: UrlStore> CacheFallbackStore<S> {
    /// Creates a store talking to the cache service at `cache_url`.
    ///
    /// `timeout` bounds every request to the cache service.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Request`] if `cache_url` is not a valid base URL or
    /// the HTTP client cannot be built.
    pub fn new(cache_url: &str, inner: S, timeout: Duration) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(cache_url)
            .map_err(|e| StoreError::Request(format!("Invalid cache URL '{}': {}", cache_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(StoreError::Request(format!(
                "Cache URL '{}' cannot be a base",
                cache_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Ok(Self {
            inner,
            base_url,
            client,
        })
    }

    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }
}

fn map_request_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Request(e.to_string())
    }
}

/// Media type of the response without parameters.
fn media_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
}

async fn problem(response: Response) -> StoreError {
    match response.json::<CacheResponse>().await {
        Ok(body) => StoreError::Server(body.description.unwrap_or_default()),
        Err(e) => StoreError::RemoteStorage(format!("Undecodable problem payload: {}", e)),
    }
}

#[async_trait]
impl<S: UrlStore> UrlStore for CacheFallbackStore<S> {
    async fn save_url(&self, url: &str, alias: &str) -> Result<String, StoreError> {
        let id = self.inner.save_url(url, alias).await?;

        let response = self
            .client
            .post(self.endpoint("set"))
            .json(&SetRequest {
                url: url.to_string(),
                alias: alias.to_string(),
            })
            .send()
            .await
            .map_err(map_request_error)?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::REQUEST_TIMEOUT => return Err(StoreError::Timeout),
            status => {
                warn!(alias, %status, "Cache write rejected");
                return Err(StoreError::RemoteStorage(format!(
                    "Cache write failed with status {}",
                    status
                )));
            }
        }

        if media_type(&response).as_deref() == Some(PROBLEM_JSON) {
            return Err(problem(response).await);
        }

        debug!(alias, id = %id, "Propagated alias to cache");
        Ok(id)
    }

    async fn resolve_url(&self, alias: &str) -> Result<String, StoreError> {
        let response = self
            .client
            .get(self.endpoint(alias))
            .send()
            .await
            .map_err(map_request_error)?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NO_CONTENT => {
                debug!(alias, "Cache MISS");
                metrics::counter!("cache_lookups_total", "result" => "miss").increment(1);
                return self.inner.resolve_url(alias).await;
            }
            StatusCode::REQUEST_TIMEOUT => return Err(StoreError::Timeout),
            status => {
                return Err(StoreError::RemoteStorage(format!(
                    "Cache read failed with status {}",
                    status
                )));
            }
        }

        match media_type(&response).as_deref() {
            Some(PROBLEM_JSON) => Err(problem(response).await),
            Some("application/json") => {
                let body = response.json::<CacheResponse>().await.map_err(|e| {
                    StoreError::RemoteStorage(format!("Undecodable cache payload: {}", e))
                })?;

                let url = body
                    .url
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| StoreError::RemoteStorage("Cache payload has no url".into()))?;

                debug!(alias, "Cache HIT");
                metrics::counter!("cache_lookups_total", "result" => "hit").increment(1);
                Ok(url)
            }
            other => Err(StoreError::RemoteStorage(format!(
                "Unrecognized cache content type: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

#[async_trait]
impl<S: UrlStore + Closeable> Closeable for CacheFallbackStore<S> {
    async fn close(&self) {
        self.inner.close().await;
    }
}
