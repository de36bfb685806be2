// Copyright 2026 KMFlow Engineering

//! Interchangeable stream backends: an in-memory queue for tests and a
//! Kafka-backed transport for production, both behind [`DurableStream`].

pub mod kafka;
pub mod memory;
pub mod traits;

pub use kafka::{KafkaStream, KafkaStreamConfig};
pub use memory::InMemoryStream;
pub use traits::{DurableStream, StreamConsumer, StreamProducer};
