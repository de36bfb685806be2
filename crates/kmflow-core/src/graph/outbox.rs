// Copyright 2026 KMFlow Engineering

//! The outbox pattern: relational writes emit a `GraphDelta` in the same
//! transaction, and a separate consumer applies it to the graph
//! projection. Apply is idempotent: MERGE by id for nodes, and
//! `(source, predicate, target, asserted_at)` for edges.

use serde::{Deserialize, Serialize};

use crate::domain::{NodeType, Predicate};

/// A single graph mutation derived from a relational write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphDelta {
    /// Upsert a node (MERGE by id).
    UpsertNode {
        /// Node id.
        id: String,
        /// Node type.
        node_type: NodeType,
        /// Owning engagement.
        engagement_id: String,
    },
    /// Upsert an edge, keyed by `(source, predicate, target, asserted_at)`.
    UpsertEdge {
        /// Source node id.
        source: String,
        /// Predicate.
        predicate: Predicate,
        /// Target node id.
        target: String,
        /// Assertion timestamp, part of the idempotency key.
        asserted_at: i64,
    },
    /// Retract an edge (bitemporal supersession/retraction), identified by
    /// the same key as the edge it updates.
    RetractEdge {
        /// Source node id.
        source: String,
        /// Predicate.
        predicate: Predicate,
        /// Target node id.
        target: String,
        /// Assertion timestamp, part of the idempotency key.
        asserted_at: i64,
        /// Retraction timestamp to record on the edge.
        retracted_at: i64,
    },
}

impl GraphDelta {
    /// Idempotency key for this delta: applying the same delta twice must
    /// be a no-op keyed on this value.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        match self {
            GraphDelta::UpsertNode { id, .. } => format!("node:{id}"),
            GraphDelta::UpsertEdge {
                source,
                predicate,
                target,
                asserted_at,
            } => format!("edge:{source}:{predicate:?}:{target}:{asserted_at}"),
            GraphDelta::RetractEdge {
                source,
                predicate,
                target,
                asserted_at,
                ..
            } => format!("edge:{source}:{predicate:?}:{target}:{asserted_at}"),
        }
    }
}

/// Append-only outbox row: a delta plus the sequence position it occupies
/// within its engagement's partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    /// Owning engagement; also the stream partition key.
    pub engagement_id: String,
    /// Monotonic sequence within the engagement.
    pub sequence: u64,
    /// The delta to apply.
    pub delta: GraphDelta,
    /// Whether a consumer has applied this entry yet.
    pub applied: bool,
}

/// In-process outbox consumer applying deltas idempotently via a
/// dedup-key set. The durable equivalent lives in `kmflow-store-postgres`,
/// backed by a unique index on the same key.
#[derive(Debug, Default)]
pub struct OutboxApplier {
    applied_keys: std::collections::HashSet<String>,
}

impl OutboxApplier {
    /// Construct an empty applier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `entry.delta` if its key has not been seen before, returning
    /// whether this call actually applied anything.
    pub fn apply(&mut self, entry: &OutboxEntry) -> bool {
        self.applied_keys.insert(entry.delta.dedup_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_entry(id: &str, sequence: u64) -> OutboxEntry {
        OutboxEntry {
            engagement_id: "e1".into(),
            sequence,
            delta: GraphDelta::UpsertNode {
                id: id.into(),
                node_type: NodeType::Activity,
                engagement_id: "e1".into(),
            },
            applied: false,
        }
    }

    #[test]
    fn reapplying_the_same_delta_is_a_no_op() {
        let mut applier = OutboxApplier::new();
        assert!(applier.apply(&node_entry("act-1", 1)));
        assert!(!applier.apply(&node_entry("act-1", 2)));
    }

    #[test]
    fn edge_dedup_key_includes_asserted_at() {
        let edge_one = GraphDelta::UpsertEdge {
            source: "a".into(),
            predicate: Predicate::Precedes,
            target: "b".into(),
            asserted_at: 1,
        };
        let edge_two = GraphDelta::UpsertEdge {
            source: "a".into(),
            predicate: Predicate::Precedes,
            target: "b".into(),
            asserted_at: 2,
        };
        assert_ne!(edge_one.dedup_key(), edge_two.dedup_key());
    }
}
