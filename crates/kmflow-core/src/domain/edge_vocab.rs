// Copyright 2026 KMFlow Engineering

//! The controlled edge vocabulary: exactly twelve predicate kinds, each
//! with source/target type constraints and structural rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node kinds that may appear as edge endpoints in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A process activity.
    Activity,
    /// An event (e.g. a trigger or completion signal).
    Event,
    /// A branching/merging gateway.
    Gateway,
    /// A data object produced or consumed by activities.
    DataObject,
    /// A governing policy or regulation.
    Policy,
    /// A role or actor responsible for an activity.
    Role,
    /// A piece of evidence.
    Evidence,
    /// An assertion (a claim extracted from evidence).
    Assertion,
    /// The top-level process.
    Process,
    /// A subprocess decomposed from a process.
    Subprocess,
}

/// The twelve controlled predicate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// Activity -> Activity, acyclic within a single variant.
    Precedes,
    /// Event|Gateway -> Activity.
    Triggers,
    /// Activity -> Activity, acyclic globally.
    DependsOn,
    /// Activity -> DataObject.
    Consumes,
    /// Activity -> DataObject.
    Produces,
    /// Process|Activity -> Policy.
    GovernedBy,
    /// Activity -> Role.
    PerformedBy,
    /// Assertion|Activity -> Evidence.
    EvidencedBy,
    /// Assertion -> Assertion, symmetric.
    Contradicts,
    /// Assertion -> Assertion, requires bitemporal validity.
    Supersedes,
    /// Process -> Subprocess, tree, no cycles.
    DecomposesInto,
    /// Activity -> Activity, symmetric.
    VariantOf,
}

impl Predicate {
    /// Allowed `(source_type, target_type)` pairs for this predicate.
    #[must_use]
    pub fn allowed_endpoints(self) -> &'static [(NodeType, NodeType)] {
        use NodeType::*;
        use Predicate::*;
        match self {
            Precedes => &[(Activity, Activity)],
            Triggers => &[(Event, Activity), (Gateway, Activity)],
            DependsOn => &[(Activity, Activity)],
            Consumes => &[(Activity, DataObject)],
            Produces => &[(Activity, DataObject)],
            GovernedBy => &[(Process, Policy), (Activity, Policy)],
            PerformedBy => &[(Activity, Role)],
            EvidencedBy => &[(Assertion, Evidence), (Activity, Evidence)],
            Contradicts => &[(Assertion, Assertion)],
            Supersedes => &[(Assertion, Assertion)],
            DecomposesInto => &[(Process, Subprocess)],
            VariantOf => &[(Activity, Activity)],
        }
    }

    /// Whether the predicate is declared symmetric in the controlled
    /// vocabulary (`CONTRADICTS`, `VARIANT_OF`).
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        matches!(self, Predicate::Contradicts | Predicate::VariantOf)
    }

    /// Whether the predicate must be acyclic, and at what scope.
    #[must_use]
    pub fn acyclicity(self) -> Acyclicity {
        match self {
            Predicate::Precedes => Acyclicity::WithinVariant,
            Predicate::DependsOn => Acyclicity::Global,
            Predicate::DecomposesInto => Acyclicity::Global,
            _ => Acyclicity::Unconstrained,
        }
    }
}

/// Scope at which an acyclicity rule applies to a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acyclicity {
    /// No cycle constraint.
    Unconstrained,
    /// Must be acyclic within a single process variant.
    WithinVariant,
    /// Must be acyclic across the whole engagement graph.
    Global,
}

/// A single proposed edge, checked against the controlled vocabulary before
/// being written by [`crate::graph::writer::GraphWriter`].
#[derive(Debug, Clone)]
pub struct ProposedEdge {
    /// Predicate kind.
    pub predicate: Predicate,
    /// Type of the source node.
    pub source_type: NodeType,
    /// Type of the target node.
    pub target_type: NodeType,
}

/// Reason a proposed edge was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EdgeRuleViolation {
    /// `(predicate, source_type, target_type)` is not in the allowed set.
    #[error("{predicate:?} does not permit {source_type:?} -> {target_type:?}")]
    DisallowedEndpoints {
        /// Offending predicate.
        predicate: Predicate,
        /// Offending source type.
        source_type: NodeType,
        /// Offending target type.
        target_type: NodeType,
    },
    /// Writing the edge would introduce a cycle where the predicate forbids
    /// one.
    #[error("{predicate:?} edge from {source_id} to {target_id} would introduce a cycle")]
    CycleIntroduced {
        /// Offending predicate.
        predicate: Predicate,
        /// Source node id.
        source_id: String,
        /// Target node id.
        target_id: String,
    },
}

/// Validates a proposed edge's endpoint types against the controlled
/// vocabulary. Cycle checks are performed separately by the graph writer,
/// which has access to the existing edge set.
pub fn validate_endpoints(edge: &ProposedEdge) -> Result<(), EdgeRuleViolation> {
    let allowed = edge.predicate.allowed_endpoints();
    if allowed
        .iter()
        .any(|(s, t)| *s == edge.source_type && *t == edge.target_type)
    {
        Ok(())
    } else {
        Err(EdgeRuleViolation::DisallowedEndpoints {
            predicate: edge.predicate,
            source_type: edge.source_type,
            target_type: edge.target_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedes_activity_to_activity_is_allowed() {
        let edge = ProposedEdge {
            predicate: Predicate::Precedes,
            source_type: NodeType::Activity,
            target_type: NodeType::Activity,
        };
        assert!(validate_endpoints(&edge).is_ok());
    }

    #[test]
    fn precedes_activity_to_role_is_rejected() {
        let edge = ProposedEdge {
            predicate: Predicate::Precedes,
            source_type: NodeType::Activity,
            target_type: NodeType::Role,
        };
        assert!(matches!(
            validate_endpoints(&edge),
            Err(EdgeRuleViolation::DisallowedEndpoints { .. })
        ));
    }

    #[test]
    fn triggers_allows_event_and_gateway_sources() {
        for src in [NodeType::Event, NodeType::Gateway] {
            let edge = ProposedEdge {
                predicate: Predicate::Triggers,
                source_type: src,
                target_type: NodeType::Activity,
            };
            assert!(validate_endpoints(&edge).is_ok());
        }
    }

    #[test]
    fn symmetric_predicates_are_flagged() {
        assert!(Predicate::Contradicts.is_symmetric());
        assert!(Predicate::VariantOf.is_symmetric());
        assert!(!Predicate::Precedes.is_symmetric());
    }

    #[test]
    fn acyclicity_scopes_match_predicate_semantics() {
        assert_eq!(Predicate::Precedes.acyclicity(), Acyclicity::WithinVariant);
        assert_eq!(Predicate::DependsOn.acyclicity(), Acyclicity::Global);
        assert_eq!(Predicate::Contradicts.acyclicity(), Acyclicity::Unconstrained);
    }
}
