// Copyright 2026 KMFlow Engineering

//! Runtime and per-engagement configuration, loaded from environment or a
//! config file and deserialized with sensible defaults so partial overrides
//! are safe.

use serde::{Deserialize, Serialize};

use crate::domain::DataResidency;

/// Process-wide runtime tuning, shared across all engagements served by a
/// single synthesis-engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum attempts before a task is marked `Failed`.
    pub retry_max_attempts: u32,
    /// Initial backoff before the first retry, in milliseconds.
    pub retry_base_ms: u64,
    /// Maximum backoff between retries, in seconds.
    pub retry_cap_secs: u64,
    /// Jitter ratio applied to computed backoff delays.
    pub retry_jitter_ratio: f64,
    /// Minimum confidence score an element must reach to be included in an
    /// assembled process model.
    pub minimum_viable_confidence: f64,
    /// Concurrency limit for tasks within a single engagement.
    pub task_semaphore_per_engagement: usize,
    /// Edge count beyond which the dependency-cap rule treats a process
    /// element as depending on too much unvalidated structure.
    pub scanner_dependency_threshold: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            retry_max_attempts: 5,
            retry_base_ms: 200,
            retry_cap_secs: 30,
            retry_jitter_ratio: 0.2,
            minimum_viable_confidence: 0.35,
            task_semaphore_per_engagement: 4,
            scanner_dependency_threshold: 8,
        }
    }
}

/// Per-engagement overrides layered on top of [`RuntimeConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Data residency constraint for this engagement.
    pub data_residency: DataResidency,
    /// Enumerated authority scopes accepted for assertions in this
    /// engagement (e.g. `"operations_team"`, `"compliance"`).
    pub authority_scopes: Vec<String>,
    /// Override of [`RuntimeConfig::minimum_viable_confidence`] for this
    /// engagement only.
    pub minimum_viable_confidence_override: Option<f64>,
    /// Maximum evidence volume accepted before ingestion starts rejecting
    /// with `QuotaExceeded`.
    pub max_evidence_items: usize,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            data_residency: DataResidency::None,
            authority_scopes: Vec::new(),
            minimum_viable_confidence_override: None,
            max_evidence_items: 250_000,
        }
    }
}

impl EngagementConfig {
    /// Effective minimum viable confidence, applying this engagement's
    /// override if present.
    #[must_use]
    pub fn effective_minimum_viable_confidence(&self, runtime: &RuntimeConfig) -> f64 {
        self.minimum_viable_confidence_override
            .unwrap_or(runtime.minimum_viable_confidence)
    }

    /// Whether `authority_scope` is permitted for this engagement. An empty
    /// allow-list means unrestricted.
    #[must_use]
    pub fn allows_authority_scope(&self, authority_scope: &str) -> bool {
        self.authority_scopes.is_empty()
            || self.authority_scopes.iter().any(|s| s == authority_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let runtime = RuntimeConfig::default();
        assert!(runtime.minimum_viable_confidence > 0.0);
        assert!(runtime.task_semaphore_per_engagement > 0);
    }

    #[test]
    fn engagement_override_wins_over_runtime_default() {
        let runtime = RuntimeConfig::default();
        let mut engagement = EngagementConfig::default();
        engagement.minimum_viable_confidence_override = Some(0.9);
        assert_eq!(engagement.effective_minimum_viable_confidence(&runtime), 0.9);
    }

    #[test]
    fn empty_scope_allowlist_permits_everything() {
        let engagement = EngagementConfig::default();
        assert!(engagement.allows_authority_scope("anything"));
    }

    #[test]
    fn nonempty_scope_allowlist_rejects_unlisted_scopes() {
        let mut engagement = EngagementConfig::default();
        engagement.authority_scopes = vec!["compliance".into()];
        assert!(engagement.allows_authority_scope("compliance"));
        assert!(!engagement.allows_authority_scope("marketing"));
    }
}
