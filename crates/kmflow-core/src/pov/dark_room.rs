// Copyright 2026 KMFlow Engineering

//! The Dark Room backlog: elements with brightness=dark awaiting reviewer
//! attention, ranked for triage.

use crate::domain::{Brightness, ProcessElement};

/// Review status of a backlog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklogStatus {
    /// Awaiting review.
    Pending,
    /// A reviewer has acted on the underlying element.
    Reviewed,
}

/// One element deferred into the backlog.
#[derive(Debug, Clone)]
pub struct BacklogEntry {
    /// Id of the deferred element.
    pub element_id: String,
    /// Confidence score at the time it was deferred, used for ranking.
    pub confidence_score: f64,
    /// Number of evidence items backing the element, used as a tie-break:
    /// more evidence despite low confidence suggests active disagreement
    /// worth reviewing sooner than a merely thin, low-confidence element.
    pub supporting_evidence_count: usize,
    /// Current status.
    pub status: BacklogStatus,
}

/// The subset of elements with brightness=dark and status=pending,
/// ranked by ascending confidence (most uncertain first) and, on ties, by
/// descending evidence count.
#[derive(Debug, Default)]
pub struct DarkRoomBacklog {
    entries: Vec<BacklogEntry>,
}

impl DarkRoomBacklog {
    /// Construct an empty backlog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every dark, unvalidated element from `elements` that is not
    /// already tracked.
    pub fn defer_all(&mut self, elements: &[ProcessElement]) {
        for e in elements {
            if e.brightness != Brightness::Dark {
                continue;
            }
            if self.entries.iter().any(|entry| entry.element_id == e.id) {
                continue;
            }
            self.entries.push(BacklogEntry {
                element_id: e.id.clone(),
                confidence_score: e.confidence_score,
                supporting_evidence_count: e.supporting_evidence_ids.len(),
                status: BacklogStatus::Pending,
            });
        }
    }

    /// Mark an entry reviewed, removing it from the pending queue.
    pub fn mark_reviewed(&mut self, element_id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.element_id == element_id) {
            entry.status = BacklogStatus::Reviewed;
        }
    }

    /// Pending entries ranked most-in-need-of-review first.
    #[must_use]
    pub fn ranked_pending(&self) -> Vec<&BacklogEntry> {
        let mut pending: Vec<&BacklogEntry> = self
            .entries
            .iter()
            .filter(|e| e.status == BacklogStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            a.confidence_score
                .partial_cmp(&b.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.supporting_evidence_count.cmp(&a.supporting_evidence_count))
        });
        pending
    }

    /// Total entries tracked, pending or reviewed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backlog holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
