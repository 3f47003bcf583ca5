//! Process wiring for the three commands.
//!
//! - [`serve`] - shortener API: store, alias generator, event producer, Axum server
//! - [`cache`] - remote cache service in front of Redis
//! - [`analytics`] - event consumer feeding metrics
//!
//! Every command stops on Ctrl-C and releases its resources in order.

use crate::analytics;
use crate::cache_service;
use crate::config::Config;
use crate::domain::HashAliasGenerator;
use crate::domain::repositories::{CacheBackend, Closeable, UrlStore};
use crate::infrastructure::cache::{CacheFallbackStore, NullCache, RedisCacheBackend};
use crate::infrastructure::persistence::SqliteStore;
use crate::mq::{ConsumerOptions, ConsumerWorker, ProducerWorker, RedisStreamReader, RedisStreamWriter};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Pause between empty reads of the event stream.
const STREAM_IDLE_INTERVAL: Duration = Duration::from_millis(200);

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Starts the Prometheus exporter if `METRICS_LISTEN` is set.
fn install_metrics_exporter(config: &Config) -> Result<()> {
    let Some(ref addr) = config.metrics_listen else {
        return Ok(());
    };

    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid METRICS_LISTEN '{}'", addr))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Metrics exporter listening on http://{addr}/metrics");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Runs the shortener API.
///
/// # Errors
///
/// Returns an error if Redis or the database cannot be reached, the cache
/// service URL is invalid, or the listener cannot be bound.
pub async fn serve(config: Config) -> Result<()> {
    install_metrics_exporter(&config)?;

    let writer = RedisStreamWriter::connect(
        config.require_redis_url()?,
        &config.events_stream,
        config.events_max_len,
    )
    .await
    .context("Failed to connect event stream")?;

    let events = Arc::new(ProducerWorker::new(
        &config.events_stream,
        Arc::new(writer),
        config.producer_pool_size,
    )?);

    let durable = SqliteStore::connect(&config.database_url, config.request_timeout())
        .await
        .context("Failed to open database")?;

    let (store, closer, store_kind): (Arc<dyn UrlStore>, Arc<dyn Closeable>, &'static str) =
        match config.cache_service_url {
            Some(ref cache_url) => {
                let store = Arc::new(CacheFallbackStore::new(
                    cache_url,
                    durable,
                    config.request_timeout(),
                )?);
                info!(cache_url = %cache_url, "Using cache-fallback store");
                let closer: Arc<dyn Closeable> = store.clone();
                (store as Arc<dyn UrlStore>, closer, "cache-fallback")
            }
            None => {
                let store = Arc::new(durable);
                info!("Using SQLite store");
                let closer: Arc<dyn Closeable> = store.clone();
                (store as Arc<dyn UrlStore>, closer, "sqlite")
            }
        };

    let state = AppState::new(
        store,
        events.clone(),
        Arc::new(HashAliasGenerator),
        &config.base_host,
        store_kind,
    );

    let listener = bind(&config.listen_addr).await?;

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    events.shutdown().await;
    closer.close().await;

    info!("Shut down");
    Ok(())
}

/// Runs the remote cache service.
///
/// Falls back to [`NullCache`] when Redis is unavailable, so clients always
/// see misses and use their durable store.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn cache(config: Config) -> Result<()> {
    install_metrics_exporter(&config)?;

    let backend: Arc<dyn CacheBackend> = match config.redis_url {
        Some(ref redis_url) => {
            match RedisCacheBackend::connect(redis_url, config.cache_ttl(), config.request_timeout())
                .await
            {
                Ok(redis) => {
                    info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        None => {
            info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    };

    let listener = bind(&config.listen_addr).await?;

    axum::serve(listener, cache_service::router(backend))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

/// Runs the analytics consumer until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the event stream cannot be joined.
pub async fn analytics(config: Config) -> Result<()> {
    install_metrics_exporter(&config)?;

    let reader = RedisStreamReader::connect(
        config.require_redis_url()?,
        &config.events_stream,
        &config.events_group,
        &config.events_consumer,
        STREAM_IDLE_INTERVAL,
    )
    .await
    .context("Failed to join event stream")?;

    let (consumer, messages) = ConsumerWorker::spawn(
        Arc::new(reader),
        ConsumerOptions {
            topic: config.events_stream.clone(),
            group: config.events_group.clone(),
            pool_size: config.consumer_pool_size,
            backoff: config.consumer_backoff(),
        },
    )?;

    let cancel = CancellationToken::new();
    let processing = tokio::spawn(analytics::run(messages, cancel.clone()));

    shutdown_signal().await;

    cancel.cancel();
    if let Err(e) = processing.await {
        error!(error = %e, "Message processing terminated abnormally");
    }
    consumer.shutdown().await;

    info!("Shut down");
    Ok(())
}
