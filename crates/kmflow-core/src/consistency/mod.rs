// Copyright 2026 KMFlow Engineering

//! Cross-source consistency scanning: the six conflict rules and the
//! three-way classifier that resolves naming variants and temporal shifts
//! automatically, leaving genuine disagreements for human review.

pub mod classifier;
pub mod rules;
pub mod severity;

pub use classifier::{classify, ClassificationOutcome};
pub use rules::{
    detect_control_gap, detect_existence_conflict, detect_io_mismatch, detect_role_conflict,
    detect_rule_conflict, detect_sequence_conflict, ExistenceClaim,
};
pub use severity::score as severity_score;

use std::collections::HashMap;

use crate::domain::{ConflictObject, ConflictStatus, MismatchType};

/// Deduplicating registry of conflicts for one engagement, enforcing the
/// idempotent-rerun contract: re-scanning never produces a second
/// `ConflictObject` for the same `(mismatch_type, sorted endpoints)` pair.
#[derive(Debug, Default)]
pub struct ConflictRegistry {
    by_key: HashMap<(MismatchType, String, String), ConflictObject>,
}

impl ConflictRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `conflict` if its dedup key is new; otherwise this is a no-op
    /// and the existing conflict is left untouched.
    pub fn insert_if_new(&mut self, conflict: ConflictObject) -> bool {
        let key = conflict.dedup_key();
        if self.by_key.contains_key(&key) {
            false
        } else {
            self.by_key.insert(key, conflict);
            true
        }
    }

    /// All conflicts still in `Open` status older than 48h relative to
    /// `now`, escalated in place.
    pub fn escalate_stale(&mut self, now: i64) -> Vec<&ConflictObject> {
        let mut escalated = Vec::new();
        for conflict in self.by_key.values_mut() {
            if conflict.should_escalate(now) {
                conflict.status = ConflictStatus::Escalated;
            }
        }
        for conflict in self.by_key.values() {
            if conflict.status == ConflictStatus::Escalated {
                escalated.push(conflict);
            }
        }
        escalated
    }

    /// Number of conflicts currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the registry holds no conflicts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(a: &str, b: &str) -> ConflictObject {
        ConflictObject {
            id: format!("{a}-{b}"),
            engagement_id: "e1".into(),
            mismatch_type: MismatchType::Sequence,
            source_a_ref: a.into(),
            source_b_ref: b.into(),
            severity: 0.5,
            resolution_type: None,
            resolution_details: None,
            status: ConflictStatus::Open,
            classified_at: None,
            detected_at: 0,
        }
    }

    #[test]
    fn rescanning_does_not_duplicate_conflicts() {
        let mut registry = ConflictRegistry::new();
        assert!(registry.insert_if_new(conflict("x", "y")));
        assert!(!registry.insert_if_new(conflict("y", "x")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn escalation_flips_status_after_window() {
        let mut registry = ConflictRegistry::new();
        registry.insert_if_new(conflict("x", "y"));
        let escalated = registry.escalate_stale(48 * 3600 + 1);
        assert_eq!(escalated.len(), 1);
        assert_eq!(escalated[0].status, ConflictStatus::Escalated);
    }
}
