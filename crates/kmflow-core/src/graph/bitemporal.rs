// Copyright 2026 KMFlow Engineering

//! Bitemporal supersession and "current truth" filtering for assertions.

use crate::domain::Assertion;

/// Retraction delta applied to the superseded assertion when a new one
/// supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersessionDelta {
    /// Id of the assertion being retracted.
    pub retracted_id: String,
    /// Timestamp to set as `retracted_at`.
    pub retracted_at: i64,
    /// Id of the assertion that now supersedes it.
    pub superseded_by: String,
}

/// Compute the delta for writing `new_assertion` with `supersedes =
/// old_assertion.id`.
#[must_use]
pub fn supersede(old_assertion: &Assertion, new_assertion: &Assertion, now: i64) -> SupersessionDelta {
    SupersessionDelta {
        retracted_id: old_assertion.id.clone(),
        retracted_at: now,
        superseded_by: new_assertion.id.clone(),
    }
}

/// Apply a [`SupersessionDelta`] to the in-memory copy of the retracted
/// assertion. The relational store applies the equivalent `UPDATE` inside
/// the same transaction that inserts the superseding row.
pub fn apply(delta: &SupersessionDelta, assertion: &mut Assertion) {
    assertion.retracted_at = Some(delta.retracted_at);
    assertion.superseded_by = Some(delta.superseded_by.clone());
}

/// Filter a slice of assertions down to "current truth" at `now`: not
/// retracted and within the bitemporal validity window.
#[must_use]
pub fn current_truth<'a>(assertions: &'a [Assertion], now: i64) -> Vec<&'a Assertion> {
    assertions.iter().filter(|a| a.is_current(now)).collect()
}
