// Copyright 2026 KMFlow Engineering

//! Process structure discovery: build the weighted directly-follows graph
//! from `PRECEDES` assertions, prune weak edges, and classify splits.

use std::collections::{HashMap, HashSet};

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;

/// A single weighted directly-follows edge prior to pruning.
#[derive(Debug, Clone)]
pub struct WeightedEdge {
    /// Upstream activity id.
    pub from: String,
    /// Downstream activity id.
    pub to: String,
    /// `source_weight * recency_factor`, summed over every asserting
    /// source.
    pub weight: f64,
}

/// A structural split discovered at a branching activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    /// Both branches execute (`PRECEDES` edges to A and B from the same
    /// predecessor, with no ordering between A and B).
    And {
        /// Branching activity.
        at: String,
        /// The two concurrent successors.
        branches: (String, String),
    },
    /// Exactly one branch executes.
    Xor {
        /// Branching activity.
        at: String,
        /// The two mutually exclusive successors.
        branches: (String, String),
    },
}

/// Sum duplicate `(from, to)` weighted edges into one, then drop edges
/// below `threshold_ratio` of the maximum outgoing weight for their
/// source.
#[must_use]
pub fn prune(edges: &[WeightedEdge], threshold_ratio: f64) -> Vec<WeightedEdge> {
    let mut summed: HashMap<(String, String), f64> = HashMap::new();
    for e in edges {
        *summed.entry((e.from.clone(), e.to.clone())).or_insert(0.0) += e.weight;
    }

    let mut max_outgoing: HashMap<String, f64> = HashMap::new();
    for ((from, _), weight) in &summed {
        let entry = max_outgoing.entry(from.clone()).or_insert(0.0);
        if *weight > *entry {
            *entry = *weight;
        }
    }

    summed
        .into_iter()
        .filter_map(|((from, to), weight)| {
            let max = max_outgoing.get(&from).copied().unwrap_or(0.0);
            if max > 0.0 && weight < threshold_ratio * max {
                None
            } else {
                Some(WeightedEdge { from, to, weight })
            }
        })
        .collect()
}

/// Discover AND/XOR splits at every branching activity, given the pruned
/// directly-follows edges and, for XOR classification, the set of case ids
/// in which each activity pair co-occurred.
#[must_use]
pub fn discover_splits(edges: &[WeightedEdge], co_occurring_cases: &HashSet<(String, String)>) -> Vec<Split> {
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for e in edges {
        successors.entry(e.from.as_str()).or_default().push(e.to.as_str());
    }
    let has_edge: HashSet<(&str, &str)> = edges.iter().map(|e| (e.from.as_str(), e.to.as_str())).collect();

    let mut splits = Vec::new();
    for (from, succs) in &successors {
        if succs.len() < 2 {
            continue;
        }
        let mut ordered = succs.clone();
        ordered.sort_unstable();
        for i in 0..ordered.len() {
            for j in (i + 1)..ordered.len() {
                let (a, b) = (ordered[i], ordered[j]);
                if has_edge.contains(&(a, b)) || has_edge.contains(&(b, a)) {
                    continue;
                }
                let pair = (a.to_string(), b.to_string());
                let reverse_pair = (b.to_string(), a.to_string());
                let co_occurs = co_occurring_cases.contains(&pair) || co_occurring_cases.contains(&reverse_pair);
                let split = if co_occurs {
                    Split::And {
                        at: from.to_string(),
                        branches: (a.to_string(), b.to_string()),
                    }
                } else {
                    Split::Xor {
                        at: from.to_string(),
                        branches: (a.to_string(), b.to_string()),
                    }
                };
                splits.push(split);
            }
        }
    }
    splits.sort_by(|a, b| split_key(a).cmp(&split_key(b)));
    splits
}

fn split_key(split: &Split) -> (String, String, String) {
    match split {
        Split::And { at, branches } => (at.clone(), branches.0.clone(), branches.1.clone()),
        Split::Xor { at, branches } => (at.clone(), branches.0.clone(), branches.1.clone()),
    }
}

/// Whether a candidate back-edge `to -> from` should be preserved as a
/// loop: `from` is reachable from `to` through the pruned directly-follows
/// graph (i.e. `from PRECEDES* to` already holds).
#[must_use]
pub fn is_preserved_loop(edges: &[WeightedEdge], from: &str, to: &str) -> bool {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for e in edges {
        graph.add_edge(e.from.as_str(), e.to.as_str(), ());
    }
    if !graph.contains_node(from) || !graph.contains_node(to) {
        return false;
    }
    has_path_connecting(&graph, from, to, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, weight: f64) -> WeightedEdge {
        WeightedEdge {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }

    #[test]
    fn weak_edges_are_pruned_relative_to_strongest_sibling() {
        let edges = vec![edge("a", "b", 10.0), edge("a", "c", 0.5)];
        let pruned = prune(&edges, 0.1);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].to, "b");
    }

    #[test]
    fn duplicate_edges_are_summed_before_pruning() {
        let edges = vec![edge("a", "b", 1.0), edge("a", "b", 2.0)];
        let pruned = prune(&edges, 0.1);
        assert_eq!(pruned.len(), 1);
        assert!((pruned[0].weight - 3.0).abs() < 1e-9);
    }

    #[test]
    fn concurrent_successors_with_no_ordering_form_and_split() {
        let edges = vec![edge("c", "a", 1.0), edge("c", "b", 1.0)];
        let mut co_occurring = HashSet::new();
        co_occurring.insert(("a".to_string(), "b".to_string()));
        let splits = discover_splits(&edges, &co_occurring);
        assert_eq!(splits.len(), 1);
        assert!(matches!(splits[0], Split::And { .. }));
    }

    #[test]
    fn mutually_exclusive_successors_form_xor_split() {
        let edges = vec![edge("c", "a", 1.0), edge("c", "b", 1.0)];
        let co_occurring = HashSet::new();
        let splits = discover_splits(&edges, &co_occurring);
        assert_eq!(splits.len(), 1);
        assert!(matches!(splits[0], Split::Xor { .. }));
    }

    #[test]
    fn ordered_successors_are_not_a_split() {
        let edges = vec![edge("c", "a", 1.0), edge("c", "b", 1.0), edge("a", "b", 1.0)];
        let co_occurring = HashSet::new();
        let splits = discover_splits(&edges, &co_occurring);
        assert!(splits.is_empty());
    }

    #[test]
    fn back_edge_on_reachable_target_is_preserved_as_a_loop() {
        let edges = vec![edge("a", "b", 1.0), edge("b", "c", 1.0)];
        assert!(is_preserved_loop(&edges, "a", "c"));
    }

    #[test]
    fn back_edge_to_unreachable_node_is_not_a_loop() {
        let edges = vec![edge("a", "b", 1.0)];
        assert!(!is_preserved_loop(&edges, "x", "y"));
    }
}
