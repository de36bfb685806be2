// Copyright 2026 KMFlow Engineering

//! Lifecycle transition orchestration for [`EvidenceItem`].

use crate::domain::{EvidenceItem, LifecycleState};
use crate::error::{Error, Result};

/// A reviewer's decision on a `PENDING` or `VALIDATED` evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationDecision {
    /// Advance the item one step forward.
    Approve,
    /// Archive the item, regardless of its current non-terminal state.
    Reject,
}

/// Apply `decision` to `item`, returning an error if the resulting
/// transition is illegal. `approve` advances `PENDING -> VALIDATED` or
/// `VALIDATED -> ACTIVE`; `reject` archives from any non-terminal state.
pub fn validate(
    item: &mut EvidenceItem,
    decision: ValidationDecision,
    reviewer_id: &str,
) -> Result<()> {
    let target = match decision {
        ValidationDecision::Approve => match item.lifecycle {
            LifecycleState::Pending => LifecycleState::Validated,
            LifecycleState::Validated => LifecycleState::Active,
            other => {
                return Err(Error::IllegalTransition {
                    entity: "EvidenceItem".to_string(),
                    from: other,
                    to: LifecycleState::Validated,
                })
            }
        },
        ValidationDecision::Reject => LifecycleState::Archived,
    };

    if !item.lifecycle.can_transition_to(target) {
        return Err(Error::IllegalTransition {
            entity: "EvidenceItem".to_string(),
            from: item.lifecycle,
            to: target,
        });
    }

    item.lifecycle = target;
    if decision == ValidationDecision::Approve {
        item.validated_by = Some(reviewer_id.to_string());
    }
    Ok(())
}

/// Move `item` from `ACTIVE` to `EXPIRED` if its freshness has fallen below
/// `threshold`. No-op (not an error) if the item is not `ACTIVE` or is
/// still fresh enough.
pub fn expire_if_stale(item: &mut EvidenceItem, threshold: f64) -> bool {
    if item.lifecycle == LifecycleState::Active && item.quality.freshness < threshold {
        item.lifecycle = LifecycleState::Expired;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvidenceCategory, QualityScores, SourcePlane};

    fn item(lifecycle: LifecycleState) -> EvidenceItem {
        EvidenceItem {
            id: "v1".into(),
            engagement_id: "e1".into(),
            category: EvidenceCategory::ProcessDocs,
            format: "pdf".into(),
            content_hash: "deadbeef".into(),
            quality: QualityScores::perfect(),
            source_plane: SourcePlane::Document,
            lifecycle,
            created_at: 0,
            validated_by: None,
            last_error: None,
        }
    }

    #[test]
    fn approve_advances_pending_to_validated_then_active() {
        let mut i = item(LifecycleState::Pending);
        validate(&mut i, ValidationDecision::Approve, "alice").unwrap();
        assert_eq!(i.lifecycle, LifecycleState::Validated);
        assert_eq!(i.validated_by.as_deref(), Some("alice"));
        validate(&mut i, ValidationDecision::Approve, "alice").unwrap();
        assert_eq!(i.lifecycle, LifecycleState::Active);
    }

    #[test]
    fn approve_from_active_is_illegal() {
        let mut i = item(LifecycleState::Active);
        let result = validate(&mut i, ValidationDecision::Approve, "alice");
        assert!(matches!(result, Err(Error::IllegalTransition { .. })));
    }

    #[test]
    fn reject_archives_from_any_nonterminal_state() {
        for state in [
            LifecycleState::Pending,
            LifecycleState::Validated,
            LifecycleState::Active,
            LifecycleState::Expired,
        ] {
            let mut i = item(state);
            validate(&mut i, ValidationDecision::Reject, "bob").unwrap();
            assert_eq!(i.lifecycle, LifecycleState::Archived);
        }
    }

    #[test]
    fn reject_from_archived_is_illegal() {
        let mut i = item(LifecycleState::Archived);
        let result = validate(&mut i, ValidationDecision::Reject, "bob");
        assert!(matches!(result, Err(Error::IllegalTransition { .. })));
    }

    #[test]
    fn stale_active_item_expires() {
        let mut i = item(LifecycleState::Active);
        i.quality.freshness = 0.1;
        assert!(expire_if_stale(&mut i, 0.2));
        assert_eq!(i.lifecycle, LifecycleState::Expired);
    }

    #[test]
    fn fresh_active_item_does_not_expire() {
        let mut i = item(LifecycleState::Active);
        i.quality.freshness = 0.9;
        assert!(!expire_if_stale(&mut i, 0.2));
        assert_eq!(i.lifecycle, LifecycleState::Active);
    }
}
