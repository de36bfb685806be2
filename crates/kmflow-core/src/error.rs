// Copyright 2026 KMFlow Engineering

//! Error taxonomy for the synthesis engine.
//!
//! Errors form a closed hierarchy per component (ingestion, graph writer,
//! consistency scanner, consensus, runtime). Each component error converts
//! into [`Error`] via `From`, so call sites can propagate with `?`.
//! Structural errors ([`Error::InvalidEdge`], [`Error::IllegalTransition`],
//! [`Error::SeedCycle`]) are never retried by the runtime; transient errors
//! are retried with backoff (see [`crate::retry`]).

use thiserror::Error;

use crate::domain::{edge_vocab::EdgeRuleViolation, evidence::LifecycleState};

/// Top-level error type for the synthesis engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A category-specific parser failed to produce fragments.
    #[error("parse error for evidence {evidence_id}: {reason}")]
    Parse {
        /// Evidence item that failed to parse.
        evidence_id: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// Ingestion found a matching content hash; this is a non-fatal signal,
    /// not a hard failure, surfaced separately from `Error` at the API
    /// boundary. Retained as a variant so internal code can propagate it
    /// uniformly before the boundary converts it into a success-with-signal
    /// response.
    #[error("duplicate evidence ignored, existing id {existing_id}")]
    DuplicateIgnored {
        /// Id of the EvidenceItem already present for this content hash.
        existing_id: String,
    },

    /// An entity's lifecycle transition is not permitted.
    #[error("illegal transition for {entity}: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Kind of entity the transition was attempted on.
        entity: String,
        /// Observed current state.
        from: LifecycleState,
        /// Requested next state.
        to: LifecycleState,
    },

    /// A graph write violated the controlled edge vocabulary.
    #[error("invalid edge: {0}")]
    InvalidEdge(#[from] EdgeRuleViolation),

    /// Read or lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller attempted to act outside its engagement scope.
    #[error("authorization denied: {0}")]
    AuthzDenied(String),

    /// Seed-term merge chain resolution found a cycle during canonicalization.
    #[error("seed term merge cycle detected starting at {0}")]
    SeedCycle(String),

    /// The graph projection has fallen behind the relational store beyond
    /// tolerance; dependent scans are frozen until it catches up.
    #[error("graph projection lag for engagement {engagement_id}: {pending} deltas pending")]
    ProjectionLag {
        /// Engagement whose projection is behind.
        engagement_id: String,
        /// Number of outbox rows not yet applied.
        pending: usize,
    },

    /// A task was cancelled cooperatively.
    #[error("task {0} cancelled")]
    Cancelled(String),

    /// A stage exceeded its configured timeout.
    #[error("stage '{stage}' timed out after {elapsed_ms}ms")]
    Timeout {
        /// Stage label.
        stage: String,
        /// Elapsed time before the timeout fired.
        elapsed_ms: u64,
    },

    /// Caller exceeded a configured quota (e.g. evidence volume).
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The engagement has been closed and rejects further mutation.
    #[error("engagement {0} is closed")]
    EngagementClosed(String),

    /// Embedding write violated model/dimension coherence for the engagement.
    #[error("embedding mismatch for engagement {engagement_id}: expected {expected_model}/{expected_dim}, got {actual_model}/{actual_dim}")]
    EmbeddingMismatch {
        /// Engagement whose embedding coherence was violated.
        engagement_id: String,
        /// Model recorded on the engagement.
        expected_model: String,
        /// Dimension recorded on the engagement.
        expected_dim: usize,
        /// Model on the incoming vector.
        actual_model: String,
        /// Dimension on the incoming vector.
        actual_dim: usize,
    },

    /// A relational or graph store operation failed. Component crates
    /// (`kmflow-store-postgres`, `kmflow-stream`) convert their local error
    /// types into this variant at the boundary.
    #[error("store error: {0}")]
    Store(String),

    /// Generic catch-all for error contexts that do not yet warrant a
    /// dedicated variant. Prefer a typed variant over reaching for this.
    #[error("{0}")]
    Other(String),
}

/// Result type alias used throughout the synthesis engine.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the runtime should retry the operation that produced this
    /// error. Local recovery is preferred for transient I/O errors;
    /// structural errors are never retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. } | Error::ProjectionLag { .. } | Error::Timeout { .. } | Error::Store(_)
        )
    }

    /// Machine-readable kind, used for audit events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "ParseError",
            Error::DuplicateIgnored { .. } => "DuplicateIgnored",
            Error::IllegalTransition { .. } => "IllegalTransition",
            Error::InvalidEdge(_) => "InvalidEdgeError",
            Error::NotFound(_) => "NotFound",
            Error::AuthzDenied(_) => "AuthzDenied",
            Error::SeedCycle(_) => "SeedCycle",
            Error::ProjectionLag { .. } => "ProjectionLag",
            Error::Cancelled(_) => "Cancelled",
            Error::Timeout { .. } => "Timeout",
            Error::QuotaExceeded(_) => "QuotaExceeded",
            Error::EngagementClosed(_) => "EngagementClosed",
            Error::EmbeddingMismatch { .. } => "EmbeddingMismatch",
            Error::Store(_) => "StoreError",
            Error::Other(_) => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors_are_transient() {
        assert!(Error::Timeout {
            stage: "ingest".into(),
            elapsed_ms: 10
        }
        .is_retryable());
        assert!(!Error::SeedCycle("x".into()).is_retryable());
        assert!(!Error::IllegalTransition {
            entity: "EvidenceItem".into(),
            from: LifecycleState::Archived,
            to: LifecycleState::Active
        }
        .is_retryable());
    }

    #[test]
    fn kind_strings_match_error_taxonomy() {
        assert_eq!(Error::NotFound("x".into()).kind(), "NotFound");
        assert_eq!(
            Error::QuotaExceeded("x".into()).kind(),
            "QuotaExceeded"
        );
    }
}
