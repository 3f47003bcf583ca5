//! Redis Streams broker.
//!
//! Readers join a consumer group and read with `NOACK`, so an entry counts
//! as delivered as soon as it is fetched and is never placed in the
//! pending list. Writers append with approximate `MAXLEN` trimming.

use super::broker::{BrokerError, BrokerMessage, BrokerReader, BrokerWriter, MessagePosition};
use async_trait::async_trait;
use redis::streams::{StreamMaxlen, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Stream entry field carrying the payload bytes.
const PAYLOAD_FIELD: &str = "payload";

/// Where a new consumer group starts: the first entry still in the stream.
pub const GROUP_START_ID: &str = "0";

async fn connect_manager(redis_url: &str) -> Result<ConnectionManager, BrokerError> {
    let client = Client::open(redis_url).map_err(|e| {
        BrokerError::Connection(format!("Failed to create Redis client: {}", e))
    })?;

    ConnectionManager::new(client)
        .await
        .map_err(|e| BrokerError::Connection(format!("Failed to connect to Redis: {}", e)))
}

fn map_redis_error(e: RedisError) -> BrokerError {
    if e.is_io_error() {
        BrokerError::Connection(e.to_string())
    } else {
        BrokerError::Protocol(e.to_string())
    }
}

/// Appends payloads to a Redis stream.
pub struct RedisStreamWriter {
    conn: ConnectionManager,
    stream: String,
    max_len: usize,
}

impl RedisStreamWriter {
    /// Connects to Redis and targets `stream`.
    ///
    /// `max_len` bounds the stream length (approximate trimming).
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Connection`] if Redis is unreachable.
    pub async fn connect(
        redis_url: &str,
        stream: &str,
        max_len: usize,
    ) -> Result<Self, BrokerError> {
        let conn = connect_manager(redis_url).await?;
        info!(stream, "Connected stream writer");

        Ok(Self {
            conn,
            stream: stream.to_string(),
            max_len,
        })
    }
}

#[async_trait]
impl BrokerWriter for RedisStreamWriter {
    async fn write(&self, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();

        let id: String = conn
            .xadd_maxlen(
                &self.stream,
                StreamMaxlen::Approx(self.max_len),
                "*",
                &[(PAYLOAD_FIELD, payload.as_slice())],
            )
            .await
            .map_err(map_redis_error)?;

        debug!(stream = %self.stream, id = %id, "XADD");
        Ok(())
    }
}

/// Reads a Redis stream as a member of a consumer group.
pub struct RedisStreamReader {
    conn: ConnectionManager,
    stream: String,
    group: String,
    consumer: String,
    idle_interval: Duration,
}

impl RedisStreamReader {
    /// Connects to Redis and makes sure the consumer group exists.
    ///
    /// A new group starts at [`GROUP_START_ID`], so entries written before
    /// the first reader joined are delivered too. An existing group is reused
    /// from its last delivered entry. `idle_interval` is how long [`BrokerReader::fetch`]
    /// waits between polls of an empty stream.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] if Redis is unreachable or the group cannot be
    /// created.
    pub async fn connect(
        redis_url: &str,
        stream: &str,
        group: &str,
        consumer: &str,
        idle_interval: Duration,
    ) -> Result<Self, BrokerError> {
        let mut conn = connect_manager(redis_url).await?;

        let created: Result<(), RedisError> =
            conn.xgroup_create_mkstream(stream, group, GROUP_START_ID).await;
        match created {
            Ok(()) => info!(stream, group, "Created consumer group"),
            Err(e) if e.code() == Some("BUSYGROUP") => {
                debug!(stream, group, "Consumer group already exists")
            }
            Err(e) => return Err(map_redis_error(e)),
        }

        info!(stream, group, consumer, "Connected stream reader");

        Ok(Self {
            conn,
            stream: stream.to_string(),
            group: group.to_string(),
            consumer: consumer.to_string(),
            idle_interval,
        })
    }

    async fn read_one(&self) -> Result<Option<BrokerMessage>, BrokerError> {
        let mut conn = self.conn.clone();
        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(1)
            .noack();

        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.stream], &[">"], &options)
            .await
            .map_err(map_redis_error)?;

        let Some(reply) = reply else {
            return Ok(None);
        };

        for key in reply.keys {
            let Some(id) = key.ids.into_iter().next() else {
                continue;
            };

            let payload: Vec<u8> = id.get(PAYLOAD_FIELD).ok_or_else(|| {
                BrokerError::Protocol(format!(
                    "Entry {} has no '{}' field",
                    id.id, PAYLOAD_FIELD
                ))
            })?;

            return Ok(Some(BrokerMessage {
                payload,
                position: MessagePosition {
                    topic: key.key,
                    offset: id.id,
                },
            }));
        }

        Ok(None)
    }
}

#[async_trait]
impl BrokerReader for RedisStreamReader {
    async fn fetch(&self) -> Result<BrokerMessage, BrokerError> {
        loop {
            if let Some(message) = self.read_one().await? {
                return Ok(message);
            }
            tokio::time::sleep(self.idle_interval).await;
        }
    }
}
