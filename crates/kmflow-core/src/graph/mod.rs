// Copyright 2026 KMFlow Engineering

//! Dual-store graph write protocol: the relational store is the system of
//! record; the graph projection is derived and eventually consistent via
//! the outbox pattern.

pub mod bitemporal;
pub mod outbox;
pub mod reconciliation;
pub mod writer;

pub use bitemporal::{apply as apply_supersession, current_truth, supersede, SupersessionDelta};
pub use outbox::{GraphDelta, OutboxApplier, OutboxEntry};
pub use reconciliation::{compare as reconcile, CountsByKind, Discrepancy};
pub use writer::{edge, propose_edge, would_introduce_cycle, LagTracker};
