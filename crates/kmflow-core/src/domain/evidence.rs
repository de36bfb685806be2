// Copyright 2026 KMFlow Engineering

//! EvidenceItem and EvidenceFragment entities.

use serde::{Deserialize, Serialize};

/// The twelve-category evidence taxonomy. Kept open-ended via the last
/// `Other` arm; the freshness half-life table below covers four buckets
/// explicitly and defaults the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    /// Regulatory text (laws, standards, compliance frameworks).
    Regulatory,
    /// Internal process documentation (SOPs, runbooks, wikis).
    ProcessDocs,
    /// Email, chat, and meeting transcripts.
    Communications,
    /// Raw documents not otherwise categorized.
    Documents,
    /// System telemetry exports (logs, traces, event streams).
    Telemetry,
    /// Screenshots or recordings of work surfaces.
    WorkSurface,
    /// Structured interview notes.
    Interview,
    /// Org charts and role definitions.
    OrgStructure,
    /// System configuration exports.
    SystemConfig,
    /// Contracts and SLAs.
    Contracts,
    /// Training materials.
    Training,
    /// Anything not covered above.
    Other,
}

impl EvidenceCategory {
    /// Half-life in days used by the freshness score.
    #[must_use]
    pub fn default_half_life_days(self) -> f64 {
        match self {
            EvidenceCategory::Regulatory => 365.0,
            EvidenceCategory::ProcessDocs => 180.0,
            EvidenceCategory::Communications => 30.0,
            _ => 90.0,
        }
    }
}

/// Which capture modality produced the evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePlane {
    /// Written/structured documents.
    Document,
    /// System-emitted telemetry.
    Telemetry,
    /// Screen captures of work surfaces.
    WorkSurface,
    /// Human interpretation (interviews, annotations).
    HumanInterp,
}

/// Lifecycle states for an EvidenceItem. Only `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Freshly ingested, awaiting validation.
    Pending,
    /// Passed validation (automatic or manual).
    Validated,
    /// In active use by the consensus engine.
    Active,
    /// No longer fresh enough to contribute.
    Expired,
    /// Terminal: rejected or retired.
    Archived,
}

impl LifecycleState {
    /// Whether `to` is a legal next state from `self`, per the state
    /// machine `PENDING -> VALIDATED -> ACTIVE -> EXPIRED -> ARCHIVED`,
    /// with `queued<->running`-style retry of `Pending` permitted and
    /// `Archived` reachable from any non-terminal state (manual rejection).
    #[must_use]
    pub fn can_transition_to(self, to: LifecycleState) -> bool {
        use LifecycleState::*;
        if to == Archived {
            return self != Archived;
        }
        matches!(
            (self, to),
            (Pending, Validated) | (Validated, Active) | (Active, Expired)
        )
    }
}

/// The four quality dimensions computed at ingest time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    /// observed_fields / expected_fields for the category schema.
    pub completeness: f64,
    /// source_class_weight × integrity_bit.
    pub reliability: f64,
    /// exp(-age_days / half_life_days), clamped to [0, 1].
    pub freshness: f64,
    /// 1 - contradicting_fragments / total_fragments.
    pub consistency: f64,
}

impl QualityScores {
    /// All-perfect scores, the initial state before any conflicts are
    /// detected: consistency starts at 1.0 and decays as conflicts surface.
    #[must_use]
    pub fn perfect() -> Self {
        Self {
            completeness: 1.0,
            reliability: 1.0,
            freshness: 1.0,
            consistency: 1.0,
        }
    }

    /// Mean across the four dimensions, used by the confidence model's
    /// `mean_quality` term of the confidence model.
    #[must_use]
    pub fn mean(self) -> f64 {
        (self.completeness + self.reliability + self.freshness + self.consistency) / 4.0
    }
}

/// A piece of evidence submitted about the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Unique identifier.
    pub id: String,
    /// Owning engagement.
    pub engagement_id: String,
    /// Taxonomy category.
    pub category: EvidenceCategory,
    /// Free-text format descriptor (e.g. "pdf", "json", "png").
    pub format: String,
    /// SHA-256 of the canonical byte stream, hex-encoded.
    pub content_hash: String,
    /// Computed quality scores.
    pub quality: QualityScores,
    /// Capture modality.
    pub source_plane: SourcePlane,
    /// Current lifecycle state.
    pub lifecycle: LifecycleState,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: i64,
    /// Reviewer id that validated this item, if any.
    pub validated_by: Option<String>,
    /// Most recent error, set when a parse/ingest retry fails.
    pub last_error: Option<String>,
}

/// A single ordered chunk of text extracted from an EvidenceItem, with its
/// embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFragment {
    /// Unique identifier.
    pub id: String,
    /// Parent evidence item.
    pub evidence_id: String,
    /// Position within the parent, zero-based.
    pub ordinal: u32,
    /// Fragment text.
    pub text: String,
    /// Embedding vector; length must equal the owning engagement's
    /// `embedding_dim`.
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    #[test]
    fn forward_transitions_are_legal() {
        assert!(Pending.can_transition_to(Validated));
        assert!(Validated.can_transition_to(Active));
        assert!(Active.can_transition_to(Expired));
    }

    #[test]
    fn skipping_states_is_illegal() {
        assert!(!Pending.can_transition_to(Active));
        assert!(!Validated.can_transition_to(Expired));
    }

    #[test]
    fn archive_reachable_from_any_nonterminal_state() {
        for state in [Pending, Validated, Active, Expired] {
            assert!(state.can_transition_to(Archived));
        }
        assert!(!Archived.can_transition_to(Archived));
    }

    #[test]
    fn half_life_table_matches_spec() {
        assert_eq!(EvidenceCategory::Regulatory.default_half_life_days(), 365.0);
        assert_eq!(EvidenceCategory::ProcessDocs.default_half_life_days(), 180.0);
        assert_eq!(
            EvidenceCategory::Communications.default_half_life_days(),
            30.0
        );
        assert_eq!(EvidenceCategory::Documents.default_half_life_days(), 90.0);
    }

    #[test]
    fn perfect_quality_mean_is_one() {
        assert_eq!(QualityScores::perfect().mean(), 1.0);
    }
}
