// Copyright 2026 KMFlow Engineering

//! Conflict severity scoring, re-exported at [`crate::consistency`] for
//! callers that only need the formula without the full conflict entity.

pub use crate::domain::conflict::{compute_severity as score, SeverityInputs};
