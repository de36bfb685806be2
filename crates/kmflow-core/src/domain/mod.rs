// Copyright 2026 KMFlow Engineering

//! Core entity types shared across ingestion, graph write-back,
//! consistency scanning, consensus, POV assembly, and the task runtime.

pub mod assertion;
pub mod conflict;
pub mod edge_vocab;
pub mod engagement;
pub mod evidence;
pub mod process_element;
pub mod seed_term;
pub mod task;

pub use assertion::{Assertion, FrameKind, TypedRef};
pub use conflict::{ConflictObject, ConflictStatus, MismatchType, ResolutionType};
pub use edge_vocab::{EdgeRuleViolation, NodeType, Predicate, ProposedEdge};
pub use engagement::{DataResidency, Engagement};
pub use evidence::{EvidenceCategory, EvidenceFragment, EvidenceItem, LifecycleState, QualityScores, SourcePlane};
pub use process_element::{Brightness, ElementType, EvidenceGrade, ProcessElement};
pub use seed_term::{SeedTerm, SeedTermCategory, SeedTermSource, SeedTermStatus};
pub use task::{Task, TaskKind, TaskStatus};
