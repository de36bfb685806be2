// Copyright 2026 KMFlow Engineering

//! Process-model assembly: turning consensus output into an immutable,
//! versioned model with structural diffing and reviewer validation
//! actions.

pub mod assembler;
pub mod dark_room;
pub mod diff;
pub mod validate;

pub use assembler::{apply_dependency_cap, assemble, DependencyEdge, ProcessModel};
pub use dark_room::{BacklogEntry, BacklogStatus, DarkRoomBacklog};
pub use diff::{diff as diff_models, ConfidenceDelta, Diff};
pub use validate::{apply as apply_decision, is_backlog_eligible, Decision, Effect};
