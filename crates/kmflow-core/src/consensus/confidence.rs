// Copyright 2026 KMFlow Engineering

//! The three-dimensional confidence model: strength, quality, and their
//! minimum as the published confidence score, plus the independent
//! evidence-grade classification.

use crate::domain::EvidenceGrade;

/// Inputs to [`strength`].
#[derive(Debug, Clone, Copy)]
pub struct StrengthInputs {
    /// Supporting planes divided by planes available in the engagement.
    pub evidence_coverage: f64,
    /// Agreeing sources divided by mentioning sources within the
    /// triangulation cluster.
    pub evidence_agreement: f64,
}

/// `strength = 0.55 * evidence_coverage + 0.45 * evidence_agreement`.
#[must_use]
pub fn strength(inputs: StrengthInputs) -> f64 {
    (0.55 * inputs.evidence_coverage + 0.45 * inputs.evidence_agreement).clamp(0.0, 1.0)
}

/// Inputs to [`quality`].
#[derive(Debug, Clone, Copy)]
pub struct QualityInputs {
    /// Mean of the four evidence quality dimensions across supporting
    /// evidence.
    pub mean_quality: f64,
    /// Reliability of the most authoritative supporting source.
    pub source_reliability: f64,
    /// Freshness-derived recency factor.
    pub evidence_recency: f64,
}

/// `quality = 0.40 * mean_quality + 0.35 * source_reliability + 0.25 *
/// evidence_recency`.
#[must_use]
pub fn quality(inputs: QualityInputs) -> f64 {
    (0.40 * inputs.mean_quality + 0.35 * inputs.source_reliability + 0.25 * inputs.evidence_recency)
        .clamp(0.0, 1.0)
}

/// `confidence = min(strength, quality)`: no single weak dimension hides
/// behind the other.
#[must_use]
pub fn confidence(strength: f64, quality: f64) -> f64 {
    strength.min(quality)
}

/// Evidence coverage: supporting planes over planes with any ACTIVE
/// evidence in the engagement.
#[must_use]
pub fn evidence_coverage(supporting_planes: usize, planes_available: usize) -> f64 {
    if planes_available == 0 {
        0.0
    } else {
        (supporting_planes as f64 / planes_available as f64).clamp(0.0, 1.0)
    }
}

/// Evidence agreement: agreeing sources over mentioning sources within the
/// triangulation cluster.
#[must_use]
pub fn evidence_agreement(agreeing_sources: usize, mentioning_sources: usize) -> f64 {
    if mentioning_sources == 0 {
        0.0
    } else {
        (agreeing_sources as f64 / mentioning_sources as f64).clamp(0.0, 1.0)
    }
}

/// Inputs to [`grade`].
#[derive(Debug, Clone, Copy)]
pub struct GradeInputs {
    /// Whether any supporting evidence has been human-validated.
    pub human_validated: bool,
    /// Number of distinct supporting evidence planes.
    pub supporting_planes: usize,
    /// Reliability of the single supporting source, used only when there
    /// is exactly one plane.
    pub single_source_reliability: f64,
    /// Whether there is any supporting evidence at all.
    pub has_evidence: bool,
}

/// Derive the independent evidence grade.
#[must_use]
pub fn grade(inputs: GradeInputs) -> EvidenceGrade {
    if !inputs.has_evidence {
        return EvidenceGrade::U;
    }
    if inputs.human_validated && inputs.supporting_planes >= 2 {
        return EvidenceGrade::A;
    }
    if inputs.supporting_planes >= 2 {
        return EvidenceGrade::B;
    }
    if inputs.single_source_reliability >= 0.5 {
        return EvidenceGrade::C;
    }
    EvidenceGrade::D
}
