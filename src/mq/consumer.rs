//! Broker subscription with a pull channel for application code.

use super::broker::{BrokerError, BrokerReader};
use crate::task::{PoolError, TaskPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Settings for a [`ConsumerWorker`].
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    /// Topic name, used for log fields only.
    pub topic: String,
    /// Consumer group, used for log fields only.
    pub group: String,
    /// Number of dispatch workers between the poll loop and the output channel.
    pub pool_size: usize,
    /// Fixed pause after a failed fetch.
    pub backoff: Duration,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            topic: "urls".to_string(),
            group: "analytics".to_string(),
            pool_size: 4,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Pulls messages from a [`BrokerReader`] and hands their payloads to the
/// receiver returned by [`ConsumerWorker::spawn`].
///
/// Delivery is at-most-once: the broker considers a message delivered when it
/// is fetched, so a message fetched but not yet read from the channel is lost
/// on shutdown or crash.
///
/// Fetch errors other than cancellation are logged and retried forever after
/// a fixed backoff.
pub struct ConsumerWorker {
    cancel: CancellationToken,
    poll_loop: JoinHandle<()>,
    pool: Arc<TaskPool>,
}

impl ConsumerWorker {
    /// Starts the poll loop.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::EmptyPool`] if `options.pool_size` is zero.
    pub fn spawn(
        reader: Arc<dyn BrokerReader>,
        options: ConsumerOptions,
    ) -> Result<(Self, mpsc::Receiver<Vec<u8>>), PoolError> {
        let pool = Arc::new(TaskPool::new("consumer", options.pool_size)?);
        let (output, messages) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let poll_loop = tokio::spawn(poll_loop(
            reader,
            pool.clone(),
            output,
            cancel.clone(),
            options,
        ));

        Ok((
            Self {
                cancel,
                poll_loop,
                pool,
            },
            messages,
        ))
    }

    /// Stops the poll loop, waits for it to exit, then shuts down the dispatch
    /// pool, abandoning hand-offs that are still waiting on the channel.
    pub async fn shutdown(self) {
        self.cancel.cancel();

        if let Err(e) = self.poll_loop.await {
            error!(error = %e, "Poll loop terminated abnormally");
        }

        self.pool.shutdown().await;
    }
}

async fn poll_loop(
    reader: Arc<dyn BrokerReader>,
    pool: Arc<TaskPool>,
    output: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
    options: ConsumerOptions,
) {
    let topic = options.topic.as_str();
    let group = options.group.as_str();

    loop {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(BrokerError::Cancelled),
            result = reader.fetch() => result,
        };

        let message = match fetched {
            Ok(message) => message,
            Err(BrokerError::Cancelled) => {
                info!(topic, consumer_group = group, "Shutting down reader");
                return;
            }
            Err(e) => {
                error!(topic, consumer_group = group, error = %e, "Error reading message");
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(options.backoff) => {}
                }
                continue;
            }
        };

        info!(
            topic = %message.position.topic,
            offset = %message.position.offset,
            consumer_group = group,
            size = message.payload.len(),
            "Received message"
        );

        let output = output.clone();
        let payload = message.payload;

        let admitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PoolError::Closed),
            admitted = pool.add_fn(move |cancel| async move {
                if cancel.is_cancelled() {
                    return;
                }
                tokio::select! {
                    _ = cancel.cancelled() => debug!("Hand-off abandoned"),
                    sent = output.send(payload) => {
                        if sent.is_err() {
                            debug!("Output channel closed, message discarded");
                        }
                    }
                }
            }) => admitted,
        };

        match admitted {
            Ok(()) => {}
            Err(PoolError::Closed) => {
                warn!(topic, consumer_group = group, "Message lost during shutdown");
                return;
            }
            Err(e) => {
                error!(topic, consumer_group = group, error = %e, "Message lost, dispatch pool unavailable");
                return;
            }
        }
    }
}
