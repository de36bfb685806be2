// Copyright 2026 KMFlow Engineering

//! Assembling consensus output into an immutable, versioned process model.

use std::collections::{HashMap, HashSet};

use crate::domain::{Brightness, ProcessElement};

/// One `DEPENDS_ON` edge between two elements, used to apply the
/// dependency brightness cap.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    /// Id of the dependent element.
    pub from: String,
    /// Id of the element depended on.
    pub to: String,
}

/// An immutable, queryable version of the synthesized process model.
#[derive(Debug, Clone)]
pub struct ProcessModel {
    /// Unique identifier.
    pub id: String,
    /// Owning engagement.
    pub engagement_id: String,
    /// Monotonically increasing version number within the engagement.
    pub version: u32,
    /// The elements in this version, in stable emission order.
    pub elements: Vec<ProcessElement>,
    /// Set when extraction failed for a subset of evidence and the model
    /// was assembled from the rest.
    pub partial: bool,
    /// Construction time (Unix epoch seconds).
    pub assembled_at: i64,
}

impl ProcessModel {
    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&ProcessElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Apply the dependency brightness cap: if A `DEPENDS_ON` B and B's
/// brightness is dark, A is capped at dim. Applied once over the full
/// element set after the coherence cap (grade vs score) has already been
/// applied to each element individually. Order-independent: a chain of
/// caps is resolved by iterating to a fixed point, since capping A may in
/// turn cap anything depending on A.
pub fn apply_dependency_cap(elements: &mut [ProcessElement], edges: &[DependencyEdge]) {
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for e in edges {
        dependents.entry(e.to.as_str()).or_default().push(e.from.as_str());
    }

    loop {
        let dark_ids: HashSet<String> = elements
            .iter()
            .filter(|e| e.brightness == Brightness::Dark)
            .map(|e| e.id.clone())
            .collect();

        let mut changed = false;
        for dark_id in &dark_ids {
            let Some(deps) = dependents.get(dark_id.as_str()) else {
                continue;
            };
            for dep_id in deps {
                if let Some(element) = elements.iter_mut().find(|e| e.id == *dep_id) {
                    if element.brightness == Brightness::Bright {
                        element.brightness = Brightness::Dim;
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/// Assemble a new immutable [`ProcessModel`] version from already-scored
/// elements and their `DEPENDS_ON` structure. The elements are expected to
/// already be in stable emission order (see
/// [`crate::consensus::triangulation::triangulate`]'s ordering guarantee).
#[must_use]
pub fn assemble(
    id: impl Into<String>,
    engagement_id: impl Into<String>,
    version: u32,
    mut elements: Vec<ProcessElement>,
    dependency_edges: &[DependencyEdge],
    partial: bool,
    now: i64,
) -> ProcessModel {
    apply_dependency_cap(&mut elements, dependency_edges);
    ProcessModel {
        id: id.into(),
        engagement_id: engagement_id.into(),
        version,
        elements,
        partial,
        assembled_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElementType, EvidenceGrade};

    fn element(id: &str, brightness: Brightness) -> ProcessElement {
        ProcessElement {
            id: id.into(),
            model_id: "m1".into(),
            element_type: ElementType::Activity,
            name: id.into(),
            confidence_score: 0.8,
            brightness,
            evidence_grade: EvidenceGrade::B,
            supporting_evidence_ids: vec![],
            validated_by: 0,
        }
    }

    #[test]
    fn dark_dependency_caps_bright_dependent_at_dim() {
        let mut elements = vec![element("a", Brightness::Bright), element("b", Brightness::Dark)];
        let edges = vec![DependencyEdge {
            from: "a".into(),
            to: "b".into(),
        }];
        apply_dependency_cap(&mut elements, &edges);
        assert_eq!(elements[0].brightness, Brightness::Dim);
    }

    #[test]
    fn cap_propagates_transitively_through_a_chain() {
        let mut elements = vec![
            element("a", Brightness::Bright),
            element("b", Brightness::Bright),
            element("c", Brightness::Dark),
        ];
        let edges = vec![
            DependencyEdge {
                from: "a".into(),
                to: "b".into(),
            },
            DependencyEdge {
                from: "b".into(),
                to: "c".into(),
            },
        ];
        apply_dependency_cap(&mut elements, &edges);
        assert_eq!(elements[1].brightness, Brightness::Dim);
        // a depends on b, which is now dim (not dark), so a is unaffected
        // by this rule; only dark dependencies cap their dependents.
        assert_eq!(elements[0].brightness, Brightness::Bright);
    }

    #[test]
    fn bright_dependency_does_not_cap() {
        let mut elements = vec![element("a", Brightness::Bright), element("b", Brightness::Bright)];
        let edges = vec![DependencyEdge {
            from: "a".into(),
            to: "b".into(),
        }];
        apply_dependency_cap(&mut elements, &edges);
        assert_eq!(elements[0].brightness, Brightness::Bright);
    }

    #[test]
    fn assemble_applies_cap_and_stamps_version() {
        let elements = vec![element("a", Brightness::Bright), element("b", Brightness::Dark)];
        let edges = vec![DependencyEdge {
            from: "a".into(),
            to: "b".into(),
        }];
        let model = assemble("model-1", "eng-1", 1, elements, &edges, false, 100);
        assert_eq!(model.version, 1);
        assert!(!model.partial);
        assert_eq!(model.element("a").unwrap().brightness, Brightness::Dim);
    }
}
