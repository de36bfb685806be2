// Copyright 2026 KMFlow Engineering

//! Durable stream transport for KMFlow's async task runtime.
//!
//! Mirrors the split `dashflow-streaming` draws between backend-agnostic
//! traits ([`backends::traits`]), an in-memory backend for tests
//! ([`backends::memory`]), and a Kafka-backed production backend
//! ([`backends::kafka`]), plus a dead-letter writer ([`dlq`]) for messages
//! that exhaust their retry budget.
//!
//! [`kmflow_core::runtime`] depends only on [`backends::DurableStream`],
//! never on a concrete backend, so a test can swap in
//! [`backends::InMemoryStream`] without touching runtime code.

#![warn(missing_docs)]

pub mod backends;
pub mod dlq;
pub mod errors;
pub mod message;

pub use backends::{DurableStream, InMemoryStream, KafkaStream, KafkaStreamConfig, StreamConsumer, StreamProducer};
pub use dlq::{DeadLetter, DeadLetterWriter};
pub use errors::{Result, StreamError};
pub use message::{
    StreamMessage, TOPIC_ERASURE_REQUESTED, TOPIC_EVIDENCE_INGESTED, TOPIC_GRAPH_UPDATED, TOPIC_POV_REQUESTED,
    TOPIC_VALIDATION_APPLIED,
};
