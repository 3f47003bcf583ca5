//! Fire-and-forget event publisher.

use super::broker::{BrokerError, BrokerWriter};
use crate::task::{PoolError, TaskPool};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Publishes JSON-encoded values to a broker topic through its own
/// [`TaskPool`].
///
/// [`ProducerWorker::publish`] returns as soon as a pool worker has accepted
/// the write; the network write itself runs in the background. Failed writes
/// are logged and dropped, there is no retry.
pub struct ProducerWorker {
    writer: Arc<dyn BrokerWriter>,
    pool: TaskPool,
    topic: Arc<str>,
}

impl ProducerWorker {
    pub const DEFAULT_POOL_SIZE: usize = 8;

    /// # Errors
    ///
    /// Returns [`PoolError::EmptyPool`] if `pool_size` is zero.
    pub fn new(
        topic: &str,
        writer: Arc<dyn BrokerWriter>,
        pool_size: usize,
    ) -> Result<Self, PoolError> {
        Ok(Self {
            writer,
            pool: TaskPool::new("producer", pool_size)?,
            topic: Arc::from(topic),
        })
    }

    /// Serializes `value` and schedules the write.
    ///
    /// Waits only for pool admission. Nothing is reported back: serialization
    /// and write failures are logged.
    pub async fn publish<T: Serialize + ?Sized>(&self, value: &T) {
        let payload = match serde_json::to_vec(value) {
            Ok(payload) => payload,
            Err(e) => {
                error!(topic = %self.topic, error = %e, "Error marshaling message");
                metrics::counter!("events_dropped_total", "reason" => "encode").increment(1);
                return;
            }
        };

        let writer = self.writer.clone();
        let topic = self.topic.clone();

        let admitted = self
            .pool
            .add_fn(move |cancel| async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        warn!(topic = %topic, "Write cancelled");
                        metrics::counter!("events_dropped_total", "reason" => "cancelled").increment(1);
                    }
                    result = writer.write(payload) => match result {
                        Ok(()) => {
                            debug!(topic = %topic, "Sent message");
                            metrics::counter!("events_published_total").increment(1);
                        }
                        Err(BrokerError::Cancelled) => {
                            warn!(topic = %topic, "Write cancelled");
                            metrics::counter!("events_dropped_total", "reason" => "cancelled").increment(1);
                        }
                        Err(e) => {
                            error!(topic = %topic, error = %e, "Error writing message");
                            metrics::counter!("events_dropped_total", "reason" => "write").increment(1);
                        }
                    },
                }
            })
            .await;

        if let Err(e) = admitted {
            warn!(topic = %self.topic, error = %e, "Message dropped");
        }
    }

    /// Shuts down the underlying pool. Writes still in flight are cancelled.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
