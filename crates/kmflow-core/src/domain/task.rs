// Copyright 2026 KMFlow Engineering

//! Task entity: the unit of work submitted to the runtime for ingestion,
//! graph write-back, consistency scans, consensus runs, POV assembly, and
//! erasure cascades.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of work a task performs. The runtime dispatches on this field
/// through a type-keyed handler registry rather than a fixed match arm, so
/// new kinds can be added without touching the runtime core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Parse, score, and fingerprint an ingested evidence item.
    Ingest,
    /// Apply an outbox delta to the graph projection.
    GraphWrite,
    /// Run the six consistency rules over an engagement's current graph.
    ConsistencyScan,
    /// Run LCD synthesis for an engagement.
    ConsensusRun,
    /// Assemble a new process-model version from consensus output.
    PovAssemble,
    /// Compare the relational and graph stores and repair drift.
    Reconciliation,
    /// Cascading deletion of a data subject's evidence and derived data.
    ErasureCascade,
}

/// Execution status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted, not yet picked up by a worker.
    Queued,
    /// Picked up and executing.
    Running,
    /// Completed without error.
    Succeeded,
    /// Exhausted its retry budget or hit a non-retryable error.
    Failed,
    /// Completed some stages; remaining stages require a follow-up task
    /// (used by multi-stage erasure cascades).
    Partial,
}

impl TaskStatus {
    /// Whether this status is terminal; terminal tasks are never re-polled.
    /// Cancellation surfaces as `Failed` (see `runtime::worker::run_once`),
    /// so there is no separate terminal cancelled state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// A unit of work tracked by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: String,
    /// Owning engagement; bounds the per-engagement concurrency semaphore.
    pub engagement_id: String,
    /// Kind of work.
    pub kind: TaskKind,
    /// Current status.
    pub status: TaskStatus,
    /// Fractional completion in [0, 1], updated at stage boundaries.
    pub progress: f64,
    /// Number of attempts made so far, including the current one.
    pub attempts: u32,
    /// Most recent error message, cleared on success.
    pub last_error: Option<String>,
    /// Opaque, kind-specific input payload.
    pub payload: Value,
    /// Opaque, kind-specific output, populated on success or partial
    /// completion.
    pub result: Option<Value>,
    /// Submission timestamp (Unix epoch seconds).
    pub submitted_at: i64,
    /// Most recent status-change timestamp.
    pub updated_at: i64,
}

impl Task {
    /// Create a freshly queued task with zero attempts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        engagement_id: impl Into<String>,
        kind: TaskKind,
        payload: Value,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            engagement_id: engagement_id.into(),
            kind,
            status: TaskStatus::Queued,
            progress: 0.0,
            attempts: 0,
            last_error: None,
            payload,
            result: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Whether another attempt is allowed given `max_attempts`.
    #[must_use]
    pub fn can_retry(&self, max_attempts: u32) -> bool {
        !self.status.is_terminal() && self.attempts < max_attempts
    }

    /// Record a failed attempt. Transitions to `Failed` once the retry
    /// budget is exhausted or `retryable` is false (structural errors,
    /// e.g. an invalid edge or illegal transition, are never retried
    /// regardless of remaining attempt budget), otherwise stays `Queued`
    /// for redelivery.
    pub fn record_failure(&mut self, error: impl Into<String>, max_attempts: u32, now: i64, retryable: bool) {
        self.attempts += 1;
        self.last_error = Some(error.into());
        self.status = if !retryable || self.attempts >= max_attempts {
            TaskStatus::Failed
        } else {
            TaskStatus::Queued
        };
        self.updated_at = now;
    }

    /// Record a successful completion.
    pub fn record_success(&mut self, result: Value, now: i64) {
        self.status = TaskStatus::Succeeded;
        self.progress = 1.0;
        self.result = Some(result);
        self.last_error = None;
        self.updated_at = now;
    }
}
