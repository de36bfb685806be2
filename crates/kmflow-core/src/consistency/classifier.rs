// Copyright 2026 KMFlow Engineering

//! The three-way classifier: every detected conflict resolves to a naming
//! variant, a temporal shift, or is left as a genuine disagreement for
//! human review.

use std::collections::HashMap;

use strsim::levenshtein;

use crate::domain::{Assertion, MismatchType, SeedTerm};
use crate::domain::seed_term::canonicalize;

/// Maximum edit distance for two labels to be treated as the same naming
/// variant absent an explicit seed-term merge chain.
pub const NAMING_VARIANT_EDIT_DISTANCE: usize = 2;

/// Result of classifying one conflicting pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// Resolved: the two labels are a naming variant of each other. Caller
    /// should emit a `VARIANT_OF` edge and mark the conflict resolved.
    NamingVariant,
    /// Resolved: the assertions' validity windows do not overlap. Caller
    /// should emit `SUPERSEDES` from the newer assertion to the older one.
    TemporalShift {
        /// Id of the assertion to mark as superseding the other.
        newer_id: String,
        /// Id of the assertion being superseded.
        older_id: String,
    },
    /// Left open for human review.
    GenuineDisagreement,
}

/// Classify a conflict between `label_a`/`label_b` (for naming-variant
/// resolution) and `assertion_a`/`assertion_b` (for temporal-shift
/// resolution), per the priority order: naming variant, then temporal
/// shift, then genuine disagreement.
#[must_use]
pub fn classify(
    label_a: &str,
    label_b: &str,
    seed_terms: &HashMap<String, SeedTerm>,
    assertion_a: &Assertion,
    assertion_b: &Assertion,
) -> ClassificationOutcome {
    if is_naming_variant(label_a, label_b, seed_terms) {
        return ClassificationOutcome::NamingVariant;
    }

    if !assertion_a.overlaps(assertion_b) {
        let (newer, older) = if assertion_a.valid_from >= assertion_b.valid_from {
            (assertion_a, assertion_b)
        } else {
            (assertion_b, assertion_a)
        };
        return ClassificationOutcome::TemporalShift {
            newer_id: newer.id.clone(),
            older_id: older.id.clone(),
        };
    }

    ClassificationOutcome::GenuineDisagreement
}

fn is_naming_variant(label_a: &str, label_b: &str, seed_terms: &HashMap<String, SeedTerm>) -> bool {
    if let (Ok(canon_a), Ok(canon_b)) = (
        canonicalize(label_a, seed_terms),
        canonicalize(label_b, seed_terms),
    ) {
        if canon_a == canon_b {
            return true;
        }
    }
    levenshtein(label_a, label_b) <= NAMING_VARIANT_EDIT_DISTANCE
}

/// Which mismatch-type outcome a [`ClassificationOutcome`] corresponds to,
/// for persistence on the `ConflictObject`.
#[must_use]
pub fn outcome_mismatch_type(outcome: &ClassificationOutcome) -> Option<MismatchType> {
    match outcome {
        ClassificationOutcome::NamingVariant => Some(MismatchType::NamingVariant),
        ClassificationOutcome::TemporalShift { .. } => Some(MismatchType::TemporalShift),
        ClassificationOutcome::GenuineDisagreement => Some(MismatchType::GenuineDisagreement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrameKind, TypedRef};

    fn assertion(id: &str, valid_from: i64, valid_to: Option<i64>) -> Assertion {
        Assertion {
            id: id.into(),
            engagement_id: "e1".into(),
            subject: TypedRef::new("act-1", "Activity"),
            predicate: crate::domain::Predicate::Precedes,
            object: TypedRef::new("act-2", "Activity"),
            frame_kind: FrameKind::Procedural,
            authority_scope: "ops".into(),
            asserted_at: 0,
            retracted_at: None,
            valid_from,
            valid_to,
            superseded_by: None,
        }
    }

    #[test]
    fn near_identical_labels_resolve_as_naming_variant() {
        let seed_terms = HashMap::new();
        let a = assertion("a1", 0, None);
        let b = assertion("a2", 0, None);
        let outcome = classify("KYC Review", "KYC Reviw", &seed_terms, &a, &b);
        assert_eq!(outcome, ClassificationOutcome::NamingVariant);
    }

    #[test]
    fn non_overlapping_windows_resolve_as_temporal_shift() {
        let seed_terms = HashMap::new();
        let older = assertion("old", 0, Some(100));
        let newer = assertion("new", 200, None);
        let outcome = classify("Account Review", "Ledger Reconciliation", &seed_terms, &older, &newer);
        assert_eq!(
            outcome,
            ClassificationOutcome::TemporalShift {
                newer_id: "new".to_string(),
                older_id: "old".to_string(),
            }
        );
    }

    #[test]
    fn distinct_overlapping_assertions_are_genuine_disagreements() {
        let seed_terms = HashMap::new();
        let a = assertion("a1", 0, None);
        let b = assertion("a2", 0, None);
        let outcome = classify("Account Review", "Ledger Reconciliation", &seed_terms, &a, &b);
        assert_eq!(outcome, ClassificationOutcome::GenuineDisagreement);
    }
}
