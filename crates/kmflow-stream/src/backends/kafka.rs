// Copyright 2026 KMFlow Engineering

//! A Kafka-backed [`DurableStream`], grounded on the client configuration
//! idioms of `dashflow-streaming::producer`/`dashflow-streaming::consumer`:
//! a `FutureProducer` for sends, a high-level `StreamConsumer` (rdkafka's,
//! not ours) with manual offset commit for at-least-once delivery.

use super::traits::{DurableStream, StreamConsumer as KmflowStreamConsumer, StreamProducer as KmflowStreamProducer};
use crate::errors::{Result, StreamError};
use crate::message::StreamMessage;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer as RdKafkaConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

/// Broker connection and consumer-group configuration shared by every
/// producer and consumer this backend creates.
#[derive(Debug, Clone)]
pub struct KafkaStreamConfig {
    /// Comma-separated `host:port` broker list.
    pub bootstrap_servers: String,
    /// Per-send delivery timeout.
    pub send_timeout: Duration,
}

impl KafkaStreamConfig {
    /// Default configuration pointed at `bootstrap_servers`.
    #[must_use]
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
        }
    }
}

/// Kafka-backed [`DurableStream`].
pub struct KafkaStream {
    config: KafkaStreamConfig,
}

impl KafkaStream {
    #[must_use]
    pub fn new(config: KafkaStreamConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DurableStream for KafkaStream {
    type Producer = KafkaProducer;
    type Consumer = KafkaConsumer;

    async fn producer(&self, topic: &str) -> Result<Self::Producer> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .set("message.timeout.ms", self.config.send_timeout.as_millis().to_string())
            .create()?;
        Ok(KafkaProducer {
            producer,
            topic: topic.to_string(),
            send_timeout: self.config.send_timeout,
        })
    }

    async fn consumer(&self, topic: &str, group_id: &str) -> Result<Self::Consumer> {
        let consumer: RdKafkaConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;
        consumer.subscribe(&[topic])?;
        Ok(KafkaConsumer {
            consumer,
            topic: topic.to_string(),
            group_id: group_id.to_string(),
        })
    }

    async fn health_check(&self) -> Result<()> {
        let probe: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .create()?;
        probe
            .client()
            .fetch_metadata(None, Timeout::After(Duration::from_secs(5)))
            .map_err(StreamError::from)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Producer half of [`KafkaStream`].
pub struct KafkaProducer {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

#[async_trait]
impl KmflowStreamProducer for KafkaProducer {
    async fn send(&self, message: StreamMessage) -> Result<()> {
        let key = message.partition_key().to_string();
        let payload = serde_json::to_vec(&message)?;
        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        self.producer
            .send(record, Timeout::After(self.send_timeout))
            .await
            .map_err(|(err, _)| StreamError::from(err))?;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.producer.flush(Timeout::After(self.send_timeout)).map_err(StreamError::from)
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

/// Consumer half of [`KafkaStream`], wrapping rdkafka's high-level
/// consumer with manual offset commit for at-least-once delivery.
pub struct KafkaConsumer {
    consumer: RdKafkaConsumer,
    topic: String,
    group_id: String,
}

#[async_trait]
impl KmflowStreamConsumer for KafkaConsumer {
    async fn next(&mut self) -> Option<Result<StreamMessage>> {
        match self.consumer.recv().await {
            Ok(borrowed) => {
                let payload = borrowed.payload()?;
                match serde_json::from_slice::<StreamMessage>(payload) {
                    Ok(message) => Some(Ok(message)),
                    Err(err) => {
                        warn!(topic = %self.topic, "failed to decode stream message: {err}");
                        Some(Err(StreamError::from(err)))
                    }
                }
            }
            Err(err) => Some(Err(StreamError::from(err))),
        }
    }

    async fn next_timeout(&mut self, timeout: Duration) -> Option<Result<StreamMessage>> {
        tokio::time::timeout(timeout, self.next()).await.unwrap_or(None)
    }

    async fn commit(&mut self) -> Result<()> {
        self.consumer.commit_consumer_state(CommitMode::Async).map_err(StreamError::from)?;
        debug!(topic = %self.topic, group = %self.group_id, "committed consumer offsets");
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn group_id(&self) -> &str {
        &self.group_id
    }
}
