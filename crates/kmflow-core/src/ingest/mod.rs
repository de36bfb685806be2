// Copyright 2026 KMFlow Engineering

//! Evidence ingestion pipeline: fingerprinting, category-specific parsing,
//! quality scoring, and lifecycle initialization.

pub mod fingerprint;
pub mod lifecycle;
pub mod quality;

pub use lifecycle::ValidationDecision;
pub use quality::ScoreInputs;

use crate::domain::{EvidenceCategory, EvidenceFragment, EvidenceItem, LifecycleState, SourcePlane};
use crate::error::{Error, Result};
use fingerprint::{content_hash, FingerprintIndex};

/// Category-specific parser, external to this crate's core logic. Each
/// evidence category (regulatory text, telemetry exports, interview
/// transcripts, ...) has its own parser implementation living in an
/// integration crate; this trait is the seam between them and the
/// ingestion pipeline.
pub trait Parser {
    /// Parse `bytes` into ordered fragments, or fail with a human-readable
    /// reason surfaced as [`Error::Parse`].
    fn parse(&self, bytes: &[u8]) -> std::result::Result<Vec<EvidenceFragment>, String>;

    /// Fields this parser expects to observe for a fully populated item,
    /// used by the completeness score.
    fn expected_fields(&self) -> u32;

    /// Fields actually observed in the last successful parse.
    fn observed_fields(&self, fragments: &[EvidenceFragment]) -> u32;
}

/// Caller-supplied parameters for a single `ingest` call.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Owning engagement.
    pub engagement_id: String,
    /// Taxonomy category; selects the parser and the freshness half-life.
    pub category: EvidenceCategory,
    /// Free-text format descriptor.
    pub format: String,
    /// Capture modality.
    pub source_plane: SourcePlane,
    /// Raw bytes to fingerprint and parse.
    pub blob: Vec<u8>,
    /// Source-class authority weight in [0, 1].
    pub source_class_weight: f64,
    /// Classifier's confidence in the parsed fragments, supplied by the
    /// category-specific parser. Feeds the auto-validation rule alongside
    /// reliability.
    pub classifier_confidence: f64,
    /// Age of the evidence in days, supplied by the caller (derived from
    /// document metadata, not wall-clock ingest time).
    pub age_days: f64,
    /// Current evidence count for the engagement, for quota enforcement.
    pub current_evidence_count: usize,
    /// Quota ceiling for the engagement.
    pub max_evidence_items: usize,
}

/// Outcome of an `ingest` call: either a newly created item or a pointer to
/// the pre-existing one, matching the idempotent content-hash contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new `EvidenceItem` was created.
    Created(String),
    /// A duplicate content hash was found; no new item was created.
    Duplicate(String),
}

/// Ingest a single evidence blob: fingerprint, dedup, parse, score, and
/// initialize lifecycle. The relational store is responsible for durable
/// persistence of the returned `EvidenceItem`; this function is pure
/// besides its use of `index` and `id_factory` for id assignment.
pub fn ingest(
    request: &IngestRequest,
    parser: &dyn Parser,
    index: &FingerprintIndex,
    id_factory: impl FnOnce() -> String,
    now: i64,
) -> Result<(IngestOutcome, Option<EvidenceItem>)> {
    if request.current_evidence_count >= request.max_evidence_items {
        return Err(Error::QuotaExceeded(format!(
            "engagement {} at {} of {} evidence items",
            request.engagement_id, request.current_evidence_count, request.max_evidence_items
        )));
    }

    let hash = content_hash(&request.blob);
    let candidate_id = id_factory();
    let (canonical_id, inserted) = index.record_or_get(&request.engagement_id, &hash, &candidate_id);

    if !inserted {
        return Ok((IngestOutcome::Duplicate(canonical_id), None));
    }

    let fragments = parser.parse(&request.blob).map_err(|reason| Error::Parse {
        evidence_id: canonical_id.clone(),
        reason,
    })?;

    let quality = quality::score(ScoreInputs {
        observed_fields: parser.observed_fields(&fragments),
        expected_fields: parser.expected_fields(),
        source_class_weight: request.source_class_weight,
        integrity_ok: true,
        age_days: request.age_days,
        category: request.category,
        contradicting_fragments: 0,
        total_fragments: fragments.len() as u32,
    });

    let lifecycle = if quality::auto_validates(quality.reliability, request.classifier_confidence) {
        LifecycleState::Validated
    } else {
        LifecycleState::Pending
    };

    let item = EvidenceItem {
        id: canonical_id.clone(),
        engagement_id: request.engagement_id.clone(),
        category: request.category,
        format: request.format.clone(),
        content_hash: hash,
        quality,
        source_plane: request.source_plane,
        lifecycle,
        created_at: now,
        validated_by: None,
        last_error: None,
    };

    Ok((IngestOutcome::Created(canonical_id), Some(item)))
}
