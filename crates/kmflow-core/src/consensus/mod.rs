// Copyright 2026 KMFlow Engineering

//! The LCD (least common denominator) consensus algorithm: triangulation,
//! process structure discovery, and the three-dimensional confidence
//! model, deterministic and tie-broken by stable orderings.

pub mod confidence;
pub mod propagation;
pub mod structure;
pub mod triangulation;

pub use confidence::{
    confidence as compute_confidence, evidence_agreement, evidence_coverage, grade, quality, strength,
};
pub use propagation::{exceeds_epsilon, EvidenceLinkIndex, DEFAULT_EPSILON};
pub use structure::{discover_splits, is_preserved_loop, prune as prune_structure, Split, WeightedEdge};
pub use triangulation::{triangulate, Candidate, TriangulatedCluster};

use std::collections::HashMap;

use crate::domain::process_element::coherent_brightness;
use crate::domain::seed_term::SeedTerm;
use crate::domain::{Brightness, ElementType, EvidenceGrade, ProcessElement};
use crate::error::Result;

use confidence::{GradeInputs, QualityInputs, StrengthInputs};

/// Per-cluster inputs needed to compute its confidence, gathered by the
/// caller from the evidence store and the triangulation cluster.
#[derive(Debug, Clone, Copy)]
pub struct ClusterSignals {
    /// Planes with any ACTIVE evidence in the engagement.
    pub planes_available: usize,
    /// Sources that mention this candidate within its cluster.
    pub mentioning_sources: usize,
    /// Sources within the cluster that agree on this candidate's
    /// attributes.
    pub agreeing_sources: usize,
    /// Mean of the four quality dimensions across supporting evidence.
    pub mean_quality: f64,
    /// Reliability of the most authoritative supporting source.
    pub source_reliability: f64,
    /// Freshness-derived recency factor.
    pub evidence_recency: f64,
    /// Whether any supporting evidence has been human-validated.
    pub human_validated: bool,
}

/// The fully scored output for one triangulated cluster, ready to become a
/// [`ProcessElement`].
#[derive(Debug, Clone)]
pub struct ScoredElement {
    /// Canonical name.
    pub canonical_name: String,
    /// Structural kind.
    pub element_type: ElementType,
    /// Combined confidence score.
    pub confidence_score: f64,
    /// Independent evidence grade.
    pub evidence_grade: EvidenceGrade,
    /// Final brightness after the coherence cap (the dependency cap is
    /// applied afterward by the POV assembler, which has the full element
    /// set).
    pub brightness: Brightness,
    /// Evidence ids backing this element.
    pub supporting_evidence_ids: Vec<String>,
}

/// Score one triangulated cluster against its gathered signals.
#[must_use]
pub fn score_cluster(cluster: &TriangulatedCluster, signals: ClusterSignals) -> ScoredElement {
    let s = strength(StrengthInputs {
        evidence_coverage: evidence_coverage(cluster.supporting_planes().len(), signals.planes_available),
        evidence_agreement: evidence_agreement(signals.agreeing_sources, signals.mentioning_sources),
    });
    let q = quality(QualityInputs {
        mean_quality: signals.mean_quality,
        source_reliability: signals.source_reliability,
        evidence_recency: signals.evidence_recency,
    });
    let confidence_score = compute_confidence(s, q);

    let supporting_planes = cluster.supporting_planes().len();
    let evidence_grade = grade(GradeInputs {
        human_validated: signals.human_validated,
        supporting_planes,
        single_source_reliability: signals.source_reliability,
        has_evidence: !cluster.members.is_empty(),
    });

    let brightness = coherent_brightness(confidence_score, evidence_grade);

    ScoredElement {
        canonical_name: cluster.canonical_name.clone(),
        element_type: cluster.element_type,
        confidence_score,
        evidence_grade,
        brightness,
        supporting_evidence_ids: cluster.members.iter().map(|c| c.evidence_ref.clone()).collect(),
    }
}

/// Run triangulation over `candidates`, scoring each resulting cluster
/// with the signals the caller has already gathered per canonical name.
/// Output is stable-sorted by `(type, canonical_name)` (triangulation's
/// own ordering), matching the POV assembler's emission order.
pub fn run(
    candidates: &[Candidate],
    seed_terms: &HashMap<String, SeedTerm>,
    signals_by_name: &HashMap<String, ClusterSignals>,
) -> Result<Vec<ScoredElement>> {
    let clusters = triangulate(candidates, seed_terms)?;
    Ok(clusters
        .iter()
        .map(|cluster| {
            let signals = signals_by_name
                .get(&cluster.canonical_name)
                .copied()
                .unwrap_or(ClusterSignals {
                    planes_available: 1,
                    mentioning_sources: 1,
                    agreeing_sources: 1,
                    mean_quality: 0.0,
                    source_reliability: 0.0,
                    evidence_recency: 0.0,
                    human_validated: false,
                });
            score_cluster(cluster, signals)
        })
        .collect())
}

/// Attach a model id and generate deterministic element ids to turn
/// [`ScoredElement`]s into persisted [`ProcessElement`]s.
#[must_use]
pub fn into_process_elements(
    scored: Vec<ScoredElement>,
    model_id: &str,
    id_factory: impl Fn(usize) -> String,
) -> Vec<ProcessElement> {
    scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| ProcessElement {
            id: id_factory(i),
            model_id: model_id.to_string(),
            element_type: s.element_type,
            name: s.canonical_name,
            confidence_score: s.confidence_score,
            brightness: s.brightness,
            evidence_grade: s.evidence_grade,
            supporting_evidence_ids: s.supporting_evidence_ids,
            validated_by: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourcePlane;

    fn candidate(name: &str, evidence_ref: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            element_type: ElementType::Activity,
            evidence_ref: evidence_ref.to_string(),
            source_plane: SourcePlane::Document,
        }
    }

    #[test]
    fn s5_cluster_scoring_matches_dark_brightness_scenario() {
        let cluster = triangulate(&[candidate("KYC Review", "v1")], &HashMap::new()).unwrap();
        let signals = ClusterSignals {
            planes_available: 4,
            mentioning_sources: 1,
            agreeing_sources: 1,
            mean_quality: 0.95,
            source_reliability: 0.2,
            evidence_recency: 0.9,
            human_validated: false,
        };
        let scored = score_cluster(&cluster[0], signals);
        assert!((scored.confidence_score - 0.5875).abs() < 1e-9);
        assert_eq!(scored.evidence_grade, EvidenceGrade::D);
        assert_eq!(scored.brightness, Brightness::Dark);
    }

    #[test]
    fn run_produces_deterministic_stable_order() {
        let candidates = vec![candidate("Zebra Check", "v1"), candidate("Account Opening", "v2")];
        let scored = run(&candidates, &HashMap::new(), &HashMap::new()).unwrap();
        assert_eq!(scored[0].canonical_name, "account opening");
        assert_eq!(scored[1].canonical_name, "zebra check");
    }
}
