// Copyright 2026 KMFlow Engineering

//! The Engagement entity: the multi-tenant boundary. Every query, write,
//! and stream message carries an `engagement_id`; crossing this boundary
//! is forbidden.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Data residency requirement for an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataResidency {
    /// No residency constraint.
    #[default]
    None,
    /// Must stay within the EU.
    Eu,
    /// Must stay within the UK.
    Uk,
    /// Engagement-specific custom residency policy.
    Custom,
}

/// A consulting engagement: the tenancy boundary for all other entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    /// Unique identifier.
    pub id: String,
    /// Free-text business area label.
    pub business_area: String,
    /// Data residency requirement.
    pub data_residency: DataResidency,
    /// Embedding model name. Immutable after the first embedding is stored.
    pub embedding_model: Option<String>,
    /// Embedding vector dimension. Immutable after the first embedding is
    /// stored.
    pub embedding_dim: Option<usize>,
    /// Whether the engagement accepts new mutations.
    pub closed: bool,
}

impl Engagement {
    /// Create a new, open engagement with no embedding model fixed yet.
    #[must_use]
    pub fn new(id: impl Into<String>, business_area: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            business_area: business_area.into(),
            data_residency: DataResidency::None,
            embedding_model: None,
            embedding_dim: None,
            closed: false,
        }
    }

    /// Reject further mutation if this engagement has been closed.
    pub fn require_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::EngagementClosed(self.id.clone()))
        } else {
            Ok(())
        }
    }

    /// Record the first embedding model/dim, or validate coherence with an
    /// already-fixed one.
    pub fn check_or_fix_embedding(&mut self, model: &str, dim: usize) -> Result<()> {
        match (&self.embedding_model, self.embedding_dim) {
            (None, _) => {
                self.embedding_model = Some(model.to_string());
                self.embedding_dim = Some(dim);
                Ok(())
            }
            (Some(existing_model), Some(existing_dim))
                if existing_model == model && existing_dim == dim =>
            {
                Ok(())
            }
            (Some(existing_model), existing_dim) => Err(Error::EmbeddingMismatch {
                engagement_id: self.id.clone(),
                expected_model: existing_model.clone(),
                expected_dim: existing_dim.unwrap_or(0),
                actual_model: model.to_string(),
                actual_dim: dim,
            }),
        }
    }
}

/// Guard helper enforcing engagement isolation: every fetched row's
/// `engagement_id` must match the caller's scope.
pub fn assert_scope(row_engagement_id: &str, caller_engagement_id: &str) -> Result<()> {
    if row_engagement_id == caller_engagement_id {
        Ok(())
    } else {
        Err(Error::AuthzDenied(format!(
            "row belongs to engagement {row_engagement_id}, caller is scoped to {caller_engagement_id}"
        )))
    }
}
