// Copyright 2026 KMFlow Engineering

//! KMFlow core synthesis engine.
//!
//! This crate owns the domain types, the controlled edge vocabulary, and
//! the algorithms that turn heterogeneous evidence into an evidence-backed
//! process model: ingestion scoring, the dual-store graph write protocol,
//! cross-source consistency scanning, the LCD consensus algorithm, POV
//! assembly, and the task runtime that schedules all of the above.
//!
//! Durable storage and message transport are provided by separate crates
//! (`kmflow-store-postgres`, `kmflow-stream`) that depend on this one; this
//! crate has no knowledge of Postgres or Kafka.
//!
//! # Layout
//!
//! - [`domain`] - entity types and the controlled edge vocabulary
//! - [`ingest`] - evidence scoring, fingerprinting, lifecycle orchestration
//! - [`graph`] - dual-store write protocol, bitemporal supersession, outbox
//! - [`consistency`] - the six cross-source conflict rules and their
//!   three-way classifier
//! - [`consensus`] - the LCD triangulation, structure discovery, and
//!   confidence model
//! - [`pov`] - process-model assembly, diffing, and validation actions
//! - [`runtime`] - the task queue, worker pool, and handler registry
//! - [`audit`], [`config`], [`error`], [`retry`] - ambient concerns shared
//!   by every component above

#![warn(missing_docs)]

pub mod audit;
pub mod config;
pub mod consensus;
pub mod consistency;
pub mod domain;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod pov;
pub mod retry;
pub mod runtime;

pub use error::{Error, Result};
