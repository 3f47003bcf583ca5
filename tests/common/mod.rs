#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use url_relay::domain::repositories::{CacheBackend, CacheBackendError, UrlStore};
use url_relay::domain::HashAliasGenerator;
use url_relay::mq::{BrokerError, BrokerWriter, ProducerWorker};
use url_relay::state::AppState;
use url_relay::infrastructure::persistence::SqliteStore;

pub const BASE_HOST: &str = "http://s.test";

/// In-process cache backend.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn evict(&self, alias: &str) {
        self.entries.lock().unwrap().remove(alias);
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, alias: &str) -> Result<Option<String>, CacheBackendError> {
        Ok(self.entries.lock().unwrap().get(alias).cloned())
    }

    async fn set(&self, alias: &str, url: &str) -> Result<(), CacheBackendError> {
        self.entries
            .lock()
            .unwrap()
            .insert(alias.to_string(), url.to_string());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Broker writer that keeps every payload in memory.
#[derive(Default)]
pub struct RecordingWriter {
    payloads: Mutex<Vec<Vec<u8>>>,
    written: Notify,
}

impl RecordingWriter {
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }

    /// Waits until at least `count` payloads were written.
    pub async fn wait_for(&self, count: usize) -> Vec<serde_json::Value> {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let notified = self.written.notified();
                if self.payloads.lock().unwrap().len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("events should be written");

        self.events()
    }
}

#[async_trait]
impl BrokerWriter for RecordingWriter {
    async fn write(&self, payload: Vec<u8>) -> Result<(), BrokerError> {
        self.payloads.lock().unwrap().push(payload);
        self.written.notify_waiters();
        Ok(())
    }
}

pub async fn memory_store() -> SqliteStore {
    SqliteStore::connect("sqlite::memory:", Duration::from_secs(5))
        .await
        .unwrap()
}

pub fn create_test_state(store: Arc<dyn UrlStore>) -> (AppState, Arc<RecordingWriter>) {
    let writer = Arc::new(RecordingWriter::default());
    let events = Arc::new(ProducerWorker::new("urls", writer.clone(), 2).unwrap());

    let state = AppState::new(
        store,
        events,
        Arc::new(HashAliasGenerator),
        BASE_HOST,
        "sqlite",
    );

    (state, writer)
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
