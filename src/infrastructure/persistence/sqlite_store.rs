//! SQLite implementation of the durable store.

use crate::domain::repositories::{Closeable, StoreError, UrlStore};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, Executor};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS urls (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    alias TEXT NOT NULL UNIQUE,
    url   TEXT NOT NULL,
    CONSTRAINT alias_not_blank CHECK (trim(alias) <> ''),
    CONSTRAINT url_not_blank CHECK (trim(url) <> '')
);
CREATE INDEX IF NOT EXISTS idx_urls_alias ON urls (alias);
"#;

/// Authoritative alias store.
///
/// All access goes through a read/write lock: resolves share it, saves take it
/// exclusively. Time spent waiting for the lock is recorded in the
/// `store_lock_wait_seconds` histogram.
pub struct SqliteStore {
    pool: SqlitePool,
    lock: RwLock<()>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and applies the schema.
    ///
    /// In-memory databases are served by a single long-lived connection so
    /// every caller sees the same data.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the URL is invalid, the database
    /// cannot be opened, or the schema cannot be applied.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .disable_statement_logging();

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = SqlitePoolOptions::new().acquire_timeout(acquire_timeout);
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            pool_options.max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        pool.execute(SCHEMA).await?;

        info!("Opened alias database");

        Ok(Self {
            pool,
            lock: RwLock::new(()),
        })
    }
}

fn record_lock_wait(kind: &'static str, started: Instant) {
    metrics::histogram!("store_lock_wait_seconds", "type" => kind)
        .record(started.elapsed().as_secs_f64());
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::AlreadyExists;
        }
        // SQLite names the failed constraint in the message.
        if db.is_check_violation() {
            return if db.message().contains("alias_not_blank") {
                StoreError::AliasEmpty
            } else {
                StoreError::UrlEmpty
            };
        }
    }

    StoreError::Database(e)
}

#[async_trait]
impl UrlStore for SqliteStore {
    async fn save_url(&self, url: &str, alias: &str) -> Result<String, StoreError> {
        let started = Instant::now();
        let _guard = self.lock.write().await;
        record_lock_wait("write", started);

        if alias.trim().is_empty() {
            return Err(StoreError::AliasEmpty);
        }
        if url.trim().is_empty() {
            return Err(StoreError::UrlEmpty);
        }

        let result = sqlx::query("INSERT INTO urls (alias, url) VALUES (?, ?)")
            .bind(alias)
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;

        let id = result.last_insert_rowid().to_string();
        debug!(alias, id = %id, "Stored alias");
        Ok(id)
    }

    async fn resolve_url(&self, alias: &str) -> Result<String, StoreError> {
        let started = Instant::now();
        let _guard = self.lock.read().await;
        record_lock_wait("read", started);

        sqlx::query_scalar::<_, String>("SELECT url FROM urls WHERE alias = ?")
            .bind(alias)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl Closeable for SqliteStore {
    async fn close(&self) {
        self.pool.close().await;
        info!("Closed alias database");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_then_resolve() {
        let store = memory_store().await;

        let id = store.save_url("https://example.com", "abc").await.unwrap();
        assert!(!id.is_empty());

        let url = store.resolve_url("abc").await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let store = memory_store().await;

        let first = store.save_url("https://a.com", "a").await.unwrap();
        let second = store.save_url("https://b.com", "b").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected() {
        let store = memory_store().await;

        store.save_url("https://x.com", "dup").await.unwrap();
        let result = store.save_url("https://x.com", "dup").await;

        assert!(matches!(result, Err(StoreError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_alias_reuse_is_rejected() {
        let store = memory_store().await;

        store.save_url("https://x.com", "taken").await.unwrap();
        let result = store.save_url("https://y.com", "taken").await;

        assert!(matches!(result, Err(StoreError::AlreadyExists)));
        assert_eq!(store.resolve_url("taken").await.unwrap(), "https://x.com");
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let store = memory_store().await;

        assert!(matches!(
            store.save_url("", "abc").await,
            Err(StoreError::UrlEmpty)
        ));
        assert!(matches!(
            store.save_url("https://x.com", "  ").await,
            Err(StoreError::AliasEmpty)
        ));
    }

    #[tokio::test]
    async fn test_blank_check_maps_to_empty_field() {
        let store = memory_store().await;
        let sql = "INSERT INTO urls (alias, url) VALUES (?, ?)";

        let err = sqlx::query(sql)
            .bind(" ")
            .bind("https://x.com")
            .execute(&store.pool)
            .await
            .unwrap_err();
        assert!(matches!(map_insert_error(err), StoreError::AliasEmpty));

        let err = sqlx::query(sql)
            .bind("abc")
            .bind("  ")
            .execute(&store.pool)
            .await
            .unwrap_err();
        assert!(matches!(map_insert_error(err), StoreError::UrlEmpty));
    }

    #[tokio::test]
    async fn test_resolve_unknown_alias() {
        let store = memory_store().await;

        assert!(matches!(
            store.resolve_url("missing").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_saves() {
        let store = Arc::new(memory_store().await);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .save_url(&format!("https://site{i}.com"), &format!("alias{i}"))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for i in 0..20 {
            let url = store.resolve_url(&format!("alias{i}")).await.unwrap();
            assert_eq!(url, format!("https://site{i}.com"));
        }
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!("url-relay-{}.db", std::process::id()));
        let database_url = format!("sqlite://{}", path.display());

        let store = SqliteStore::connect(&database_url, Duration::from_secs(5))
            .await
            .unwrap();
        store.save_url("https://kept.com", "kept").await.unwrap();
        store.close().await;

        let reopened = SqliteStore::connect(&database_url, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reopened.resolve_url("kept").await.unwrap(), "https://kept.com");
        reopened.close().await;

        let _ = std::fs::remove_file(path);
    }
}
