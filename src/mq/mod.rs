//! Message broker integration.
//!
//! - [`broker`] - reader/writer traits and message types
//! - [`producer`] - fire-and-forget publisher backed by a task pool
//! - [`consumer`] - poll loop feeding a pull channel through a task pool
//! - [`redis_stream`] - Redis Streams implementation of the broker traits

pub mod broker;
pub mod consumer;
pub mod producer;
pub mod redis_stream;

pub use broker::{BrokerError, BrokerMessage, BrokerReader, BrokerWriter, MessagePosition};
pub use consumer::{ConsumerOptions, ConsumerWorker};
pub use producer::ProducerWorker;
pub use redis_stream::{RedisStreamReader, RedisStreamWriter};
