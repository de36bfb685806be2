// Copyright 2026 KMFlow Engineering

//! The four quality-dimension computations applied to newly ingested
//! evidence.

use crate::domain::{EvidenceCategory, QualityScores};

/// Inputs to [`score`], gathered by the category-specific parser and the
/// ingestion caller.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    /// Fields the category-specific parser actually observed.
    pub observed_fields: u32,
    /// Fields the category schema expects.
    pub expected_fields: u32,
    /// Source-class weight in [0, 1] (e.g. signed regulatory text scores
    /// higher than an anonymous chat export).
    pub source_class_weight: f64,
    /// Whether the computed content hash matches the expected one supplied
    /// by the caller, if any was supplied.
    pub integrity_ok: bool,
    /// Age of the evidence in days at scoring time.
    pub age_days: f64,
    /// Evidence category, used to look up the freshness half-life.
    pub category: EvidenceCategory,
    /// Fragments that a consistency scan has flagged as contradicting
    /// another source, at the time of scoring.
    pub contradicting_fragments: u32,
    /// Total fragments extracted from this evidence item.
    pub total_fragments: u32,
}

/// Compute completeness, reliability, freshness, and consistency.
#[must_use]
pub fn score(inputs: ScoreInputs) -> QualityScores {
    let completeness = if inputs.expected_fields == 0 {
        1.0
    } else {
        (f64::from(inputs.observed_fields) / f64::from(inputs.expected_fields)).clamp(0.0, 1.0)
    };

    let integrity_bit = if inputs.integrity_ok { 1.0 } else { 0.0 };
    let reliability = (inputs.source_class_weight * integrity_bit).clamp(0.0, 1.0);

    let half_life = inputs.category.default_half_life_days();
    let freshness = (-inputs.age_days / half_life).exp().clamp(0.0, 1.0);

    let consistency = if inputs.total_fragments == 0 {
        1.0
    } else {
        (1.0 - f64::from(inputs.contradicting_fragments) / f64::from(inputs.total_fragments))
            .clamp(0.0, 1.0)
    };

    QualityScores {
        completeness,
        reliability,
        freshness,
        consistency,
    }
}

/// Whether an evidence item with the given reliability should
/// auto-advance from `PENDING` to `VALIDATED`: `reliability >= 0.5` and
/// `classifier_confidence >= 0.8`.
#[must_use]
pub fn auto_validates(reliability: f64, classifier_confidence: f64) -> bool {
    reliability >= 0.5 && classifier_confidence >= 0.8
}
