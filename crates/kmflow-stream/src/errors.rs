// Copyright 2026 KMFlow Engineering

//! Error types for the stream transport.

use thiserror::Error;

/// Errors raised by a [`crate::backends::DurableStream`] implementation or
/// the dead-letter writer built on top of it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// The backend (Kafka broker, in-memory queue) rejected the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// A message could not be serialized to or deserialized from its wire
    /// representation.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The named topic has no registered partition/consumer group state.
    #[error("topic not found: {0}")]
    TopicNotFound(String),

    /// The stream (or this handle to it) has been closed.
    #[error("stream closed")]
    Closed,

    /// A receive timed out without a message arriving.
    #[error("receive timed out")]
    Timeout,

    /// The underlying Kafka client reported an error.
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Mirrors `impl From<PostgresError> for dashflow::Error`: stream errors
/// fold into the engine's top-level `Error::Store` at the crate boundary,
/// the same as `kmflow-store-postgres`'s `StoreError`, so a transient
/// broker error is classified retryable by `Error::is_retryable`.
impl From<StreamError> for kmflow_core::Error {
    fn from(err: StreamError) -> Self {
        kmflow_core::Error::Store(err.to_string())
    }
}
