//! Broker-facing traits shared by the producer and consumer workers.

use async_trait::async_trait;

/// Broker-assigned position of a delivered message.
///
/// For Redis Streams `topic` is the stream key and `offset` the entry id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePosition {
    pub topic: String,
    pub offset: String,
}

/// An opaque payload fetched from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub payload: Vec<u8>,
    pub position: MessagePosition,
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The operation was abandoned because its owner is shutting down.
    #[error("broker operation cancelled")]
    Cancelled,
    #[error("broker connection error: {0}")]
    Connection(String),
    #[error("broker protocol error: {0}")]
    Protocol(String),
}

/// Publishes payloads to a single topic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerWriter: Send + Sync {
    async fn write(&self, payload: Vec<u8>) -> Result<(), BrokerError>;
}

/// Fetches payloads from a subscription.
///
/// A successful fetch acknowledges the message: it will not be redelivered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerReader: Send + Sync {
    /// Waits for the next message.
    async fn fetch(&self) -> Result<BrokerMessage, BrokerError>;
}
