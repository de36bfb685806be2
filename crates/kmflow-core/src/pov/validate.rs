// Copyright 2026 KMFlow Engineering

//! Reviewer validation actions against a synthesized process element.

use crate::domain::process_element::promote_on_confirm;
use crate::domain::{ConflictObject, ConflictStatus, EvidenceGrade, MismatchType, ProcessElement};
use crate::error::{Error, Result};

/// A reviewer decision applied to a single process element.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Accept the element as correctly synthesized.
    Confirm,
    /// Replace the element's backing claim with a corrected one.
    Correct {
        /// Id of the new, corrected assertion.
        new_assertion_id: String,
    },
    /// Reject the element outright.
    Reject {
        /// Id of the assertion being retracted.
        assertion_id: String,
    },
    /// Defer judgment; the element joins the dark-room backlog.
    Defer,
}

/// Side effects of applying a [`Decision`], beyond the mutation already
/// made to the element in place.
#[derive(Debug, Clone)]
pub enum Effect {
    /// No further side effect.
    None,
    /// A new assertion superseding the original should be written, keyed
    /// by the new assertion's id.
    SupersedingAssertion {
        /// Id of the original assertion being superseded.
        superseded_id: String,
        /// Id of the new assertion.
        new_assertion_id: String,
    },
    /// An existence conflict was opened and the named assertion should be
    /// retracted.
    ExistenceConflictOpened {
        /// The conflict record to persist.
        conflict: ConflictObject,
        /// Id of the assertion to retract.
        retracted_assertion_id: String,
    },
    /// The element should be added to the dark-room backlog.
    DeferredToBacklog,
}

/// Apply `decision` to `element`, mutating it in place and returning the
/// side effect the caller must carry out against the assertion store.
pub fn apply(
    element: &mut ProcessElement,
    decision: Decision,
    conflict_id: impl Into<String>,
    engagement_id: impl Into<String>,
    now: i64,
) -> Result<Effect> {
    match decision {
        Decision::Confirm => {
            element.evidence_grade = promote_on_confirm(element.evidence_grade);
            element.validated_by += 1;
            Ok(Effect::None)
        }
        Decision::Correct { new_assertion_id } => {
            let Some(superseded_id) = element.supporting_evidence_ids.first().cloned() else {
                return Err(Error::NotFound(format!("no supporting assertion for element {}", element.id)));
            };
            Ok(Effect::SupersedingAssertion {
                superseded_id,
                new_assertion_id,
            })
        }
        Decision::Reject { assertion_id } => {
            let conflict = ConflictObject {
                id: conflict_id.into(),
                engagement_id: engagement_id.into(),
                mismatch_type: MismatchType::Existence,
                source_a_ref: element.id.clone(),
                source_b_ref: assertion_id.clone(),
                severity: 1.0,
                resolution_type: None,
                resolution_details: Some("rejected by reviewer".to_string()),
                status: ConflictStatus::Resolved,
                classified_at: Some(now),
                detected_at: now,
            };
            Ok(Effect::ExistenceConflictOpened {
                conflict,
                retracted_assertion_id: assertion_id,
            })
        }
        Decision::Defer => Ok(Effect::DeferredToBacklog),
    }
}

/// Whether `element` is eligible to be deferred to the dark-room backlog:
/// brightness dark and not already validated.
#[must_use]
pub fn is_backlog_eligible(element: &ProcessElement) -> bool {
    matches!(element.evidence_grade, EvidenceGrade::D | EvidenceGrade::U) && element.validated_by == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Brightness, ElementType};

    fn element(grade: EvidenceGrade) -> ProcessElement {
        ProcessElement {
            id: "elem-1".into(),
            model_id: "m1".into(),
            element_type: ElementType::Activity,
            name: "KYC Review".into(),
            confidence_score: 0.5,
            brightness: Brightness::Dark,
            evidence_grade: grade,
            supporting_evidence_ids: vec!["a1".into()],
            validated_by: 0,
        }
    }

    #[test]
    fn confirm_promotes_grade_and_counts_validation() {
        let mut e = element(EvidenceGrade::C);
        let effect = apply(&mut e, Decision::Confirm, "c1", "e1", 0).unwrap();
        assert_eq!(e.evidence_grade, EvidenceGrade::B);
        assert_eq!(e.validated_by, 1);
        assert!(matches!(effect, Effect::None));
    }

    #[test]
    fn correct_emits_superseding_assertion_effect() {
        let mut e = element(EvidenceGrade::C);
        let effect = apply(
            &mut e,
            Decision::Correct {
                new_assertion_id: "a2".into(),
            },
            "c1",
            "e1",
            0,
        )
        .unwrap();
        match effect {
            Effect::SupersedingAssertion {
                superseded_id,
                new_assertion_id,
            } => {
                assert_eq!(superseded_id, "a1");
                assert_eq!(new_assertion_id, "a2");
            }
            _ => panic!("expected SupersedingAssertion"),
        }
    }

    #[test]
    fn reject_opens_existence_conflict_and_retracts() {
        let mut e = element(EvidenceGrade::C);
        let effect = apply(
            &mut e,
            Decision::Reject {
                assertion_id: "a1".into(),
            },
            "c1",
            "e1",
            0,
        )
        .unwrap();
        match effect {
            Effect::ExistenceConflictOpened {
                conflict,
                retracted_assertion_id,
            } => {
                assert_eq!(conflict.mismatch_type, MismatchType::Existence);
                assert_eq!(retracted_assertion_id, "a1");
            }
            _ => panic!("expected ExistenceConflictOpened"),
        }
    }

    #[test]
    fn defer_eligible_elements_are_dark_and_unvalidated() {
        let e = element(EvidenceGrade::D);
        assert!(is_backlog_eligible(&e));
    }

    #[test]
    fn validated_elements_are_not_backlog_eligible() {
        let mut e = element(EvidenceGrade::D);
        e.validated_by = 1;
        assert!(!is_backlog_eligible(&e));
    }
}
