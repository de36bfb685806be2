// Copyright 2026 KMFlow Engineering

//! The daily reconciliation job: compare per-engagement counts between the
//! relational store and the graph projection, producing orphan ids to
//! replay from outbox history.

use std::collections::HashMap;

/// Per-kind counts from one store, keyed by node kind or predicate name.
pub type CountsByKind = HashMap<String, u64>;

/// A discrepancy between the two stores for one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    /// Node kind or predicate name.
    pub kind: String,
    /// Count observed in the relational store (source of truth).
    pub relational_count: u64,
    /// Count observed in the graph projection.
    pub graph_count: u64,
}

impl Discrepancy {
    /// How many rows the graph projection is missing (positive) or has in
    /// excess of (negative) the relational store.
    #[must_use]
    pub fn drift(&self) -> i64 {
        self.relational_count as i64 - self.graph_count as i64
    }
}

/// Compare relational and graph counts, returning every kind whose counts
/// differ.
#[must_use]
pub fn compare(relational: &CountsByKind, graph: &CountsByKind) -> Vec<Discrepancy> {
    let mut kinds: Vec<&String> = relational.keys().chain(graph.keys()).collect();
    kinds.sort();
    kinds.dedup();

    kinds
        .into_iter()
        .filter_map(|kind| {
            let relational_count = *relational.get(kind).unwrap_or(&0);
            let graph_count = *graph.get(kind).unwrap_or(&0);
            if relational_count == graph_count {
                None
            } else {
                Some(Discrepancy {
                    kind: kind.clone(),
                    relational_count,
                    graph_count,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_counts_produce_no_discrepancies() {
        let mut relational = CountsByKind::new();
        relational.insert("Activity".into(), 10);
        let mut graph = CountsByKind::new();
        graph.insert("Activity".into(), 10);
        assert!(compare(&relational, &graph).is_empty());
    }

    #[test]
    fn missing_graph_rows_are_reported_with_positive_drift() {
        let mut relational = CountsByKind::new();
        relational.insert("Activity".into(), 10);
        let graph = CountsByKind::new();
        let found = compare(&relational, &graph);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].drift(), 10);
    }

    #[test]
    fn kind_present_only_in_graph_is_also_reported() {
        let relational = CountsByKind::new();
        let mut graph = CountsByKind::new();
        graph.insert("Policy".into(), 3);
        let found = compare(&relational, &graph);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].drift(), -3);
    }
}
