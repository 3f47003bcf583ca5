//! # url-relay
//!
//! A URL shortener built around three concurrency pieces:
//!
//! - [`task::TaskPool`] - fixed-size worker pool with rendezvous submission
//! - [`mq::ProducerWorker`] / [`mq::ConsumerWorker`] - fire-and-forget event
//!   publishing and a pull channel over a message broker (Redis Streams)
//! - [`infrastructure::cache::CacheFallbackStore`] - write-through/read-through
//!   proxy for a remote cache service in front of the durable
//!   [`infrastructure::persistence::SqliteStore`]
//!
//! ## Processes
//!
//! One binary, three commands:
//!
//! - `serve` - HTTP API ([`routes`]): shorten URLs, redirect aliases, publish events
//! - `cache` - remote cache service ([`cache_service`]) over Redis
//! - `analytics` - consumes events ([`analytics`]) and records metrics
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379"
//! export DATABASE_URL="sqlite://urls.db?mode=rwc"
//!
//! cargo run -- serve
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].

pub mod analytics;
pub mod api;
pub mod cache_service;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod mq;
pub mod routes;
pub mod server;
pub mod state;
pub mod task;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::domain::repositories::{Closeable, StoreError, UrlStore};
    pub use crate::domain::{AliasGenerator, HashAliasGenerator, UrlEvent};
    pub use crate::error::AppError;
    pub use crate::mq::{BrokerReader, BrokerWriter, ConsumerWorker, ProducerWorker};
    pub use crate::state::AppState;
    pub use crate::infrastructure::cache::CacheFallbackStore;
    pub use crate::infrastructure::persistence::{NullStore, SqliteStore};
    pub use crate::task::{PoolError, TaskPool};
}
