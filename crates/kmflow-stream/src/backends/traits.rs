// Copyright 2026 KMFlow Engineering

//! Abstract traits for streaming backends, so the runtime can swap between
//! an in-memory queue (tests) and a Kafka-backed transport (production)
//! without changing call sites.

use crate::errors::Result;
use crate::message::StreamMessage;
use async_trait::async_trait;
use std::time::Duration;

/// A durable, partitioned, append-only stream with consumer-group fan-out.
///
/// Backends implement this to provide producer and consumer creation;
/// `kmflow_core::runtime` depends only on this trait, never on a concrete
/// backend.
#[async_trait]
pub trait DurableStream: Send + Sync {
    /// Concrete producer type this backend hands out.
    type Producer: StreamProducer;
    /// Concrete consumer type this backend hands out.
    type Consumer: StreamConsumer;

    /// Create a producer for `topic`.
    async fn producer(&self, topic: &str) -> Result<Self::Producer>;

    /// Create a consumer for `topic` within consumer group `group_id`.
    /// Consumers in the same group share delivery: each message goes to
    /// exactly one group member.
    async fn consumer(&self, topic: &str, group_id: &str) -> Result<Self::Consumer>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Release backend resources.
    async fn close(&self) -> Result<()>;
}

/// Publishes [`StreamMessage`]s to a single topic.
#[async_trait]
pub trait StreamProducer: Send + Sync {
    /// Send `message`, partitioned by [`StreamMessage::partition_key`].
    async fn send(&self, message: StreamMessage) -> Result<()>;

    /// Block until all previously sent messages are durable.
    async fn flush(&self) -> Result<()>;

    /// The topic this producer sends to.
    fn topic(&self) -> &str;
}

/// Consumes [`StreamMessage`]s from a single topic within a consumer
/// group.
#[async_trait]
pub trait StreamConsumer: Send + Sync {
    /// Receive the next message, blocking until one is available or the
    /// stream is closed.
    async fn next(&mut self) -> Option<Result<StreamMessage>>;

    /// Receive the next message, giving up after `timeout`.
    async fn next_timeout(&mut self, timeout: Duration) -> Option<Result<StreamMessage>>;

    /// Commit the current offset. Delivery is at-least-once: a crash
    /// between receive and commit redelivers the message.
    async fn commit(&mut self) -> Result<()>;

    /// The topic this consumer reads from.
    fn topic(&self) -> &str;
    /// The consumer group this consumer belongs to.
    fn group_id(&self) -> &str;
}
