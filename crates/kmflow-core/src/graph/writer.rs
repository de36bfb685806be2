// Copyright 2026 KMFlow Engineering

//! The graph writer: validates proposed edges against the controlled
//! vocabulary and produces the outbox deltas the relational transaction
//! commits alongside its own rows.

use crate::domain::edge_vocab::{validate_endpoints, ProposedEdge};
use crate::domain::NodeType;
use crate::error::{Error, Result};
use crate::graph::outbox::GraphDelta;

/// Propose writing an edge with `asserted_at`, validating it against the
/// controlled vocabulary before turning it into a [`GraphDelta`].
///
/// Cycle checks (`§3.3` acyclicity rules) require the existing edge set and
/// are the caller's responsibility once this passes the endpoint check;
/// this function surfaces [`Error::InvalidEdge`] for endpoint violations
/// only.
pub fn propose_edge(
    edge: &ProposedEdge,
    source_id: &str,
    target_id: &str,
    asserted_at: i64,
) -> Result<GraphDelta> {
    validate_endpoints(edge).map_err(Error::from)?;
    Ok(GraphDelta::UpsertEdge {
        source: source_id.to_string(),
        predicate: edge.predicate,
        target: target_id.to_string(),
        asserted_at,
    })
}

/// Check a proposed edge for the cycle it would introduce, given an
/// existing adjacency list restricted to the predicate's acyclicity scope.
/// `existing_edges` pairs are `(source_id, target_id)`.
pub fn would_introduce_cycle(
    edge: &ProposedEdge,
    source_id: &str,
    target_id: &str,
    existing_edges: &[(String, String)],
) -> bool {
    use crate::domain::edge_vocab::Acyclicity;
    if edge.predicate.acyclicity() == Acyclicity::Unconstrained {
        return false;
    }
    // A new edge source->target introduces a cycle iff target can already
    // reach source through the existing edge set.
    reachable(target_id, source_id, existing_edges)
}

fn reachable(from: &str, to: &str, edges: &[(String, String)]) -> bool {
    let mut visited = std::collections::HashSet::new();
    let mut stack = vec![from.to_string()];
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !visited.insert(node.clone()) {
            continue;
        }
        for (s, t) in edges {
            if *s == node {
                stack.push(t.clone());
            }
        }
    }
    false
}

/// Tracks per-engagement outbox lag to raise [`Error::ProjectionLag`] when
/// the graph projection falls too far behind the relational store.
#[derive(Debug, Clone, Copy)]
pub struct LagTracker {
    max_pending: usize,
}

impl LagTracker {
    /// Construct a tracker with the given tolerance.
    #[must_use]
    pub fn new(max_pending: usize) -> Self {
        Self { max_pending }
    }

    /// Check `pending` outbox rows for `engagement_id`, erroring once the
    /// tolerance is exceeded.
    pub fn check(&self, engagement_id: &str, pending: usize) -> Result<()> {
        if pending > self.max_pending {
            Err(Error::ProjectionLag {
                engagement_id: engagement_id.to_string(),
                pending,
            })
        } else {
            Ok(())
        }
    }
}

/// Node kind pair helper used by callers assembling a [`ProposedEdge`] from
/// domain entities.
#[must_use]
pub fn edge(predicate: crate::domain::Predicate, source_type: NodeType, target_type: NodeType) -> ProposedEdge {
    ProposedEdge {
        predicate,
        source_type,
        target_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Predicate;

    #[test]
    fn valid_edge_produces_upsert_delta() {
        let e = edge(Predicate::Precedes, NodeType::Activity, NodeType::Activity);
        let delta = propose_edge(&e, "act-1", "act-2", 10).unwrap();
        assert!(matches!(delta, GraphDelta::UpsertEdge { .. }));
    }

    #[test]
    fn invalid_endpoints_reject_before_touching_outbox() {
        let e = edge(Predicate::Precedes, NodeType::Activity, NodeType::Role);
        let result = propose_edge(&e, "act-1", "role-1", 10);
        assert!(matches!(result, Err(Error::InvalidEdge(_))));
    }

    #[test]
    fn cycle_detected_for_acyclic_predicate() {
        let e = edge(Predicate::DependsOn, NodeType::Activity, NodeType::Activity);
        let existing = vec![
            ("b".to_string(), "c".to_string()),
            ("c".to_string(), "a".to_string()),
        ];
        assert!(would_introduce_cycle(&e, "a", "b", &existing));
    }

    #[test]
    fn no_cycle_for_fresh_chain() {
        let e = edge(Predicate::DependsOn, NodeType::Activity, NodeType::Activity);
        let existing = vec![("b".to_string(), "c".to_string())];
        assert!(!would_introduce_cycle(&e, "a", "b", &existing));
    }

    #[test]
    fn symmetric_predicate_is_never_flagged_as_cyclic() {
        let e = edge(Predicate::Contradicts, NodeType::Assertion, NodeType::Assertion);
        let existing = vec![("b".to_string(), "a".to_string())];
        assert!(!would_introduce_cycle(&e, "a", "b", &existing));
    }

    #[test]
    fn lag_tracker_trips_past_tolerance() {
        let tracker = LagTracker::new(10);
        assert!(tracker.check("e1", 5).is_ok());
        assert!(matches!(
            tracker.check("e1", 11),
            Err(Error::ProjectionLag { .. })
        ));
    }
}
