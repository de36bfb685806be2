// Copyright 2026 KMFlow Engineering

//! ConflictObject entity: the record of a detected cross-source
//! disagreement and its eventual classification and resolution.

use serde::{Deserialize, Serialize};

/// The kind of cross-source mismatch detected by a consistency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchType {
    /// Rule 1: contradictory PRECEDES orderings.
    Sequence,
    /// Rule 2: conflicting PERFORMED_BY assignments.
    Role,
    /// Rule 3: mutually exclusive GOVERNED_BY conditions.
    Rule,
    /// Rule 4: asserted by one source, denied by another.
    Existence,
    /// Rule 5: PRODUCES/CONSUMES identity mismatch.
    Io,
    /// Rule 6: policy applies but no GOVERNED_BY edge exists.
    ControlGap,
    /// Classifier outcome: resolved as a naming variant.
    NamingVariant,
    /// Classifier outcome: resolved as a temporal shift.
    TemporalShift,
    /// Classifier outcome: left open as a genuine disagreement.
    GenuineDisagreement,
}

/// Lifecycle status of a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    /// Newly detected, awaiting classification/resolution.
    Open,
    /// Assigned to a reviewer.
    Assigned,
    /// Resolved automatically or by a reviewer.
    Resolved,
    /// Open for longer than the escalation window (48h).
    Escalated,
}

/// How a conflict was ultimately resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    /// Resolved by emitting a VARIANT_OF edge.
    NamingVariant,
    /// Resolved by emitting a SUPERSEDES edge.
    TemporalShift,
    /// Resolved manually by a human reviewer.
    ManualReview,
}

/// A persistent record of a detected cross-source disagreement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictObject {
    /// Unique identifier.
    pub id: String,
    /// Owning engagement.
    pub engagement_id: String,
    /// Mismatch classification.
    pub mismatch_type: MismatchType,
    /// Reference to the first side of the disagreement (opaque id string,
    /// e.g. an assertion or evidence id).
    pub source_a_ref: String,
    /// Reference to the second side.
    pub source_b_ref: String,
    /// Severity in [0, 1].
    pub severity: f64,
    /// How it was resolved, if resolved.
    pub resolution_type: Option<ResolutionType>,
    /// Free-text resolution details.
    pub resolution_details: Option<String>,
    /// Current status.
    pub status: ConflictStatus,
    /// When the three-way classifier ran, if it has.
    pub classified_at: Option<i64>,
    /// When this conflict was first detected (used for the 48h escalation
    /// window).
    pub detected_at: i64,
}

impl ConflictObject {
    /// Uniqueness key for idempotent detection: `(mismatch_type,
    /// sorted(source_a_ref, source_b_ref))` within an engagement.
    #[must_use]
    pub fn dedup_key(&self) -> (MismatchType, String, String) {
        let (a, b) = if self.source_a_ref <= self.source_b_ref {
            (self.source_a_ref.clone(), self.source_b_ref.clone())
        } else {
            (self.source_b_ref.clone(), self.source_a_ref.clone())
        };
        (self.mismatch_type, a, b)
    }

    /// Whether this conflict should be auto-escalated: open for more than
    /// 48h.
    #[must_use]
    pub fn should_escalate(&self, now: i64) -> bool {
        const ESCALATION_WINDOW_SECS: i64 = 48 * 3600;
        self.status == ConflictStatus::Open && now - self.detected_at > ESCALATION_WINDOW_SECS
    }
}

/// Severity inputs for the weighted formula:
/// `severity = clamp(0.4*|w_A-w_B| + 0.3*recency_factor + 0.3*criticality, 0, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct SeverityInputs {
    /// Authority weight of source A in [0, 1].
    pub authority_weight_a: f64,
    /// Authority weight of source B in [0, 1].
    pub authority_weight_b: f64,
    /// Recency factor in [0, 1]; newer disagreements score higher.
    pub recency_factor: f64,
    /// Criticality of the affected activity in [0, 1].
    pub criticality: f64,
}

/// Computes conflict severity from authority weight skew, recency, and
/// criticality.
#[must_use]
pub fn compute_severity(inputs: SeverityInputs) -> f64 {
    let raw = 0.4 * (inputs.authority_weight_a - inputs.authority_weight_b).abs()
        + 0.3 * inputs.recency_factor
        + 0.3 * inputs.criticality;
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(a: &str, b: &str, detected_at: i64, status: ConflictStatus) -> ConflictObject {
        ConflictObject {
            id: "c1".into(),
            engagement_id: "e1".into(),
            mismatch_type: MismatchType::Sequence,
            source_a_ref: a.into(),
            source_b_ref: b.into(),
            severity: 0.5,
            resolution_type: None,
            resolution_details: None,
            status,
            classified_at: None,
            detected_at,
        }
    }

    #[test]
    fn dedup_key_is_order_independent() {
        let c1 = conflict("x", "y", 0, ConflictStatus::Open);
        let c2 = conflict("y", "x", 0, ConflictStatus::Open);
        assert_eq!(c1.dedup_key(), c2.dedup_key());
    }

    #[test]
    fn escalation_triggers_after_48h() {
        let c = conflict("x", "y", 0, ConflictStatus::Open);
        assert!(!c.should_escalate(48 * 3600 - 1));
        assert!(c.should_escalate(48 * 3600 + 1));
    }

    #[test]
    fn resolved_conflicts_never_escalate() {
        let c = conflict("x", "y", 0, ConflictStatus::Resolved);
        assert!(!c.should_escalate(1_000_000));
    }

    #[test]
    fn severity_is_clamped_to_unit_interval() {
        let inputs = SeverityInputs {
            authority_weight_a: 1.0,
            authority_weight_b: 0.0,
            recency_factor: 1.0,
            criticality: 1.0,
        };
        assert_eq!(compute_severity(inputs), 1.0);
    }
}
