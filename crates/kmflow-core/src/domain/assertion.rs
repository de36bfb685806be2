// Copyright 2026 KMFlow Engineering

//! Assertion entity. Assertions are never mutated in place; retraction or
//! supersession always produces a new row referencing the old one.

use serde::{Deserialize, Serialize};

use super::edge_vocab::Predicate;

/// A typed reference to a graph node, scoped by its engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRef {
    /// Referenced node id.
    pub id: String,
    /// Referenced node's type tag (e.g. "Activity", "Policy").
    pub node_type: String,
}

impl TypedRef {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
        }
    }
}

/// The epistemic frame of an assertion: how it was obtained and under what
/// authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Derived from documented procedure.
    Procedural,
    /// Derived from a regulation or policy.
    Regulatory,
    /// Derived from a human's first-hand account.
    Experiential,
    /// Derived from system telemetry.
    Telemetric,
    /// Manually entered by a consultant.
    Elicited,
    /// Inferred from observed behavior.
    Behavioral,
}

/// A claim extracted from evidence, recorded in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    /// Unique identifier.
    pub id: String,
    /// Owning engagement.
    pub engagement_id: String,
    /// Subject of the claim.
    pub subject: TypedRef,
    /// Controlled-vocabulary predicate.
    pub predicate: Predicate,
    /// Object of the claim.
    pub object: TypedRef,
    /// Epistemic frame kind.
    pub frame_kind: FrameKind,
    /// Controlled authority scope string, supplied by engagement config.
    pub authority_scope: String,
    /// When the claim was made (Unix epoch seconds).
    pub asserted_at: i64,
    /// When the claim was retracted, if ever.
    pub retracted_at: Option<i64>,
    /// Start of the bitemporal validity window.
    pub valid_from: i64,
    /// End of the bitemporal validity window, open-ended if `None`.
    pub valid_to: Option<i64>,
    /// Id of the assertion that superseded this one, if any.
    pub superseded_by: Option<String>,
}

impl Assertion {
    /// Whether this assertion is "current truth" at time `now`: not
    /// retracted and within its validity window.
    #[must_use]
    pub fn is_current(&self, now: i64) -> bool {
        self.retracted_at.is_none()
            && self.valid_from <= now
            && self.valid_to.map_or(true, |to| to > now)
    }

    /// Whether `self` and `other`'s validity windows overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Assertion) -> bool {
        let self_end = self.valid_to.unwrap_or(i64::MAX);
        let other_end = other.valid_to.unwrap_or(i64::MAX);
        self.valid_from < other_end && other.valid_from < self_end
    }

    /// Produce the retraction delta for `self` when superseded by `new_id`
    /// at `now`: writing a new assertion with `supersedes = self` sets
    /// `self.retracted_at = now` and `self.superseded_by = new_id`. The
    /// original row is never mutated in place in the store; this returns
    /// the field values the graph writer applies.
    #[must_use]
    pub fn supersede(now: i64, new_id: &str) -> (i64, String) {
        (now, new_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assertion(valid_from: i64, valid_to: Option<i64>) -> Assertion {
        Assertion {
            id: "a1".into(),
            engagement_id: "e1".into(),
            subject: TypedRef::new("act-1", "Activity"),
            predicate: Predicate::Precedes,
            object: TypedRef::new("act-2", "Activity"),
            frame_kind: FrameKind::Procedural,
            authority_scope: "operations_team".into(),
            asserted_at: 0,
            retracted_at: None,
            valid_from,
            valid_to,
            superseded_by: None,
        }
    }

    #[test]
    fn current_truth_requires_not_retracted_and_in_window() {
        let a = assertion(0, Some(100));
        assert!(a.is_current(50));
        assert!(!a.is_current(150));
    }

    #[test]
    fn retracted_assertion_is_never_current() {
        let mut a = assertion(0, None);
        a.retracted_at = Some(10);
        assert!(!a.is_current(5));
    }

    #[test]
    fn non_overlapping_windows_are_temporal_shift_candidates() {
        // Source A valid 2022-01-01..2023-01-01, source B valid
        // 2023-06-01..now. These do not overlap.
        let a = assertion(1_640_995_200, Some(1_672_531_200));
        let b = assertion(1_685_577_600, None);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn overlapping_windows_are_genuine_disagreement_candidates() {
        let a = assertion(0, None);
        let b = assertion(0, None);
        assert!(a.overlaps(&b));
    }
}
