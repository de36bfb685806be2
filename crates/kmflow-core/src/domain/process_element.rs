// Copyright 2026 KMFlow Engineering

//! ProcessElement entity, brightness, and evidence grade, including the
//! coherence cap between score-derived and grade-derived brightness.

use serde::{Deserialize, Serialize};

/// Structural kind of a process element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// A unit of work.
    Activity,
    /// A decision point.
    Decision,
    /// A branching/merging gateway.
    Gateway,
    /// A triggering or terminal event.
    Event,
}

/// Visualization brightness derived from confidence and grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brightness {
    /// Low confidence / evidence; flagged for attention.
    Dark,
    /// Moderate confidence.
    Dim,
    /// High confidence, well-evidenced.
    Bright,
}

/// Provenance classification, independent of the numeric confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceGrade {
    /// Human-validated and >=2 supporting planes.
    A,
    /// >=2 supporting planes, not human-validated.
    B,
    /// Single plane, reliability >= 0.5.
    C,
    /// Single source, unvalidated.
    D,
    /// No supporting evidence in scope.
    U,
}

impl EvidenceGrade {
    /// The brightness cap implied by this grade alone, independent of the
    /// numeric confidence score.
    #[must_use]
    pub fn brightness_cap(self) -> Brightness {
        match self {
            EvidenceGrade::A | EvidenceGrade::B => Brightness::Bright,
            EvidenceGrade::C => Brightness::Dim,
            EvidenceGrade::D | EvidenceGrade::U => Brightness::Dark,
        }
    }
}

/// A node of the synthesized process model, regenerated per POV version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessElement {
    /// Unique identifier.
    pub id: String,
    /// POV version this element belongs to.
    pub model_id: String,
    /// Structural kind.
    pub element_type: ElementType,
    /// Canonical display name.
    pub name: String,
    /// Numeric confidence in [0, 1].
    pub confidence_score: f64,
    /// Derived brightness.
    pub brightness: Brightness,
    /// Provenance grade.
    pub evidence_grade: EvidenceGrade,
    /// Evidence items supporting this element.
    pub supporting_evidence_ids: Vec<String>,
    /// Number of times a reviewer has confirmed this element.
    pub validated_by: u32,
}

/// Promote an evidence grade one step along the reviewer-confirmation
/// chain `C -> B -> A`. Grades `D` and `U` have no confirmation path and
/// are returned unchanged.
#[must_use]
pub fn promote_on_confirm(grade: EvidenceGrade) -> EvidenceGrade {
    match grade {
        EvidenceGrade::C => EvidenceGrade::B,
        EvidenceGrade::B => EvidenceGrade::A,
        other => other,
    }
}

/// Derive final brightness from score-derived and grade-derived brightness,
/// taking the minimum (the coherence cap). A further dependency cap is
/// applied afterward by the caller, which has access to the full element
/// set.
#[must_use]
pub fn coherent_brightness(confidence: f64, grade: EvidenceGrade) -> Brightness {
    let score_brightness = if confidence >= 0.75 {
        Brightness::Bright
    } else if confidence >= 0.40 {
        Brightness::Dim
    } else {
        Brightness::Dark
    };
    score_brightness.min(grade.brightness_cap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_confidence_cap_scenario() {
        // Moderate confidence, weak grade: the grade cap wins.
        let brightness = coherent_brightness(0.5875, EvidenceGrade::D);
        assert_eq!(brightness, Brightness::Dark);
    }

    #[test]
    fn grade_d_or_u_never_bright_even_with_high_score() {
        for grade in [EvidenceGrade::D, EvidenceGrade::U] {
            let brightness = coherent_brightness(0.99, grade);
            assert_ne!(brightness, Brightness::Bright);
            assert!(matches!(brightness, Brightness::Dark | Brightness::Dim));
        }
    }

    #[test]
    fn high_score_and_grade_a_is_bright() {
        assert_eq!(coherent_brightness(0.9, EvidenceGrade::A), Brightness::Bright);
    }

    #[test]
    fn brightness_ordering_is_dark_lt_dim_lt_bright() {
        assert!(Brightness::Dark < Brightness::Dim);
        assert!(Brightness::Dim < Brightness::Bright);
    }

    #[test]
    fn confirm_chain_promotes_c_through_b_to_a() {
        let after_first = promote_on_confirm(EvidenceGrade::C);
        assert_eq!(after_first, EvidenceGrade::B);
        let after_second = promote_on_confirm(after_first);
        assert_eq!(after_second, EvidenceGrade::A);
    }

    #[test]
    fn confirm_does_not_affect_d_or_u() {
        assert_eq!(promote_on_confirm(EvidenceGrade::D), EvidenceGrade::D);
        assert_eq!(promote_on_confirm(EvidenceGrade::U), EvidenceGrade::U);
    }
}
