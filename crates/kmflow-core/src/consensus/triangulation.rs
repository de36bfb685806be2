// Copyright 2026 KMFlow Engineering

//! Candidate triangulation: merge extracted candidate elements that share
//! a canonical `(type, name)` after seed-term resolution.

use std::collections::HashMap;

use crate::domain::seed_term::canonicalize;
use crate::domain::{ElementType, SeedTerm, SourcePlane};
use crate::error::Result;

/// A candidate element surfaced by the entity extractor, prior to
/// triangulation.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Raw extracted name, not yet canonicalized.
    pub name: String,
    /// Structural kind.
    pub element_type: ElementType,
    /// Id of the evidence fragment this candidate came from.
    pub evidence_ref: String,
    /// Capture modality of the source.
    pub source_plane: SourcePlane,
}

/// A cluster of candidates sharing a canonical `(type, name)`.
#[derive(Debug, Clone)]
pub struct TriangulatedCluster {
    /// Canonical name shared by every member.
    pub canonical_name: String,
    /// Structural kind shared by every member.
    pub element_type: ElementType,
    /// All candidates that triangulated into this cluster, in extraction
    /// order.
    pub members: Vec<Candidate>,
}

impl TriangulatedCluster {
    /// Distinct source planes contributing to this cluster.
    #[must_use]
    pub fn supporting_planes(&self) -> Vec<SourcePlane> {
        let mut planes: Vec<SourcePlane> = self.members.iter().map(|c| c.source_plane).collect();
        planes.sort_by_key(plane_rank);
        planes.dedup();
        planes
    }

    /// Lowest evidence ref among members, used as the output tie-break key.
    #[must_use]
    pub fn lowest_evidence_ref(&self) -> Option<&str> {
        self.members.iter().map(|c| c.evidence_ref.as_str()).min()
    }
}

fn plane_rank(plane: &SourcePlane) -> u8 {
    match plane {
        SourcePlane::Document => 0,
        SourcePlane::Telemetry => 1,
        SourcePlane::WorkSurface => 2,
        SourcePlane::HumanInterp => 3,
    }
}

/// Merge candidates sharing `(element_type, canonical_name)` into
/// clusters, using the active seed-term merge chain for canonicalization.
/// Output is sorted by `(type, canonical_name)` for stable emission, with
/// ties broken by lowest evidence ref.
pub fn triangulate(
    candidates: &[Candidate],
    seed_terms: &HashMap<String, SeedTerm>,
) -> Result<Vec<TriangulatedCluster>> {
    let mut clusters: HashMap<(ElementType, String), TriangulatedCluster> = HashMap::new();

    for candidate in candidates {
        let canonical_name = canonicalize(&candidate.name, seed_terms)?;
        let key = (candidate.element_type, canonical_name.clone());
        clusters
            .entry(key)
            .or_insert_with(|| TriangulatedCluster {
                canonical_name,
                element_type: candidate.element_type,
                members: Vec::new(),
            })
            .members
            .push(candidate.clone());
    }

    let mut out: Vec<TriangulatedCluster> = clusters.into_values().collect();
    out.sort_by(|a, b| {
        (a.element_type as u8, &a.canonical_name)
            .cmp(&(b.element_type as u8, &b.canonical_name))
            .then_with(|| a.lowest_evidence_ref().cmp(&b.lowest_evidence_ref()))
    });
    Ok(out)
}
