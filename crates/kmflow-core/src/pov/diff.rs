// Copyright 2026 KMFlow Engineering

//! Structural diff between two process model versions.

use std::collections::HashMap;

use super::assembler::ProcessModel;

/// Confidence movement for an element present in both versions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceDelta {
    /// Element id.
    pub element_id: String,
    /// Confidence in the earlier version.
    pub before: f64,
    /// Confidence in the later version.
    pub after: f64,
}

impl ConfidenceDelta {
    /// Signed change in confidence (`after - before`).
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}

/// Structural and confidence differences between two versions of a process
/// model belonging to the same engagement.
#[derive(Debug, Clone, Default)]
pub struct Diff {
    /// Element ids present in `b` but not `a`.
    pub added: Vec<String>,
    /// Element ids present in `a` but not `b`.
    pub removed: Vec<String>,
    /// Confidence movement for element ids present in both, sorted by id.
    pub changed: Vec<ConfidenceDelta>,
}

/// Compute the set-difference on element ids between two versions plus the
/// per-element confidence delta for everything that survived.
#[must_use]
pub fn diff(a: &ProcessModel, b: &ProcessModel) -> Diff {
    let by_id_a: HashMap<&str, f64> = a.elements.iter().map(|e| (e.id.as_str(), e.confidence_score)).collect();
    let by_id_b: HashMap<&str, f64> = b.elements.iter().map(|e| (e.id.as_str(), e.confidence_score)).collect();

    let mut added: Vec<String> = by_id_b.keys().filter(|id| !by_id_a.contains_key(*id)).map(|s| s.to_string()).collect();
    added.sort();

    let mut removed: Vec<String> = by_id_a.keys().filter(|id| !by_id_b.contains_key(*id)).map(|s| s.to_string()).collect();
    removed.sort();

    let mut changed: Vec<ConfidenceDelta> = by_id_a
        .iter()
        .filter_map(|(id, before)| {
            by_id_b.get(id).map(|after| ConfidenceDelta {
                element_id: (*id).to_string(),
                before: *before,
                after: *after,
            })
        })
        .collect();
    changed.sort_by(|x, y| x.element_id.cmp(&y.element_id));

    Diff { added, removed, changed }
}
