// Copyright 2026 KMFlow Engineering

//! Append-only audit trail. Every mutation that crosses an engagement
//! boundary, every error surfaced to a caller, and every consensus/graph
//! write emits an [`AuditEvent`] through the configured [`AuditSink`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::Result;

/// A single audit record. Sinks must treat these as immutable once
/// accepted; there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Engagement the event occurred within.
    pub engagement_id: String,
    /// Actor that triggered the event (user id, service account, or
    /// `"system"` for background tasks).
    pub actor: String,
    /// Dot-separated action name, e.g. `"evidence.ingest"`,
    /// `"assertion.supersede"`, `"task.failed"`.
    pub action: String,
    /// Machine-readable outcome kind. For errors this is
    /// [`crate::error::Error::kind`]; for successes, `"Ok"`.
    pub outcome: String,
    /// Action-specific structured detail.
    pub detail: Value,
    /// Unix epoch seconds at emission time.
    pub occurred_at: i64,
}

impl AuditEvent {
    /// Build a successful-outcome event.
    #[must_use]
    pub fn ok(
        engagement_id: impl Into<String>,
        actor: impl Into<String>,
        action: impl Into<String>,
        detail: Value,
        now: i64,
    ) -> Self {
        Self {
            engagement_id: engagement_id.into(),
            actor: actor.into(),
            action: action.into(),
            outcome: "Ok".to_string(),
            detail,
            occurred_at: now,
        }
    }

    /// Build an error-outcome event from an [`crate::error::Error`] kind
    /// string.
    #[must_use]
    pub fn error(
        engagement_id: impl Into<String>,
        actor: impl Into<String>,
        action: impl Into<String>,
        kind: &'static str,
        detail: Value,
        now: i64,
    ) -> Self {
        Self {
            engagement_id: engagement_id.into(),
            actor: actor.into(),
            action: action.into(),
            outcome: kind.to_string(),
            detail,
            occurred_at: now,
        }
    }
}

/// Destination for audit events. Implementations must be append-only: no
/// method on this trait allows removing or rewriting a previously accepted
/// event.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append `event` to the trail.
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

/// In-process audit sink backed by an append-only `Vec`, used by tests and
/// by single-node deployments without a durable audit store configured.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    /// Construct an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all recorded events in insertion order.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        info!(
            engagement_id = %event.engagement_id,
            action = %event.action,
            outcome = %event.outcome,
            "audit event"
        );
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn recorded_events_are_retained_in_order() {
        let sink = InMemoryAuditSink::new();
        sink.record(AuditEvent::ok("e1", "alice", "evidence.ingest", json!({}), 1))
            .await
            .unwrap();
        sink.record(AuditEvent::ok("e1", "alice", "evidence.validate", json!({}), 2))
            .await
            .unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "evidence.ingest");
        assert_eq!(events[1].action, "evidence.validate");
    }

    #[tokio::test]
    async fn error_event_carries_error_kind_as_outcome() {
        let sink = InMemoryAuditSink::new();
        sink.record(AuditEvent::error(
            "e1",
            "system",
            "task.failed",
            "Timeout",
            json!({"stage": "ingest"}),
            5,
        ))
        .await
        .unwrap();
        assert_eq!(sink.events()[0].outcome, "Timeout");
    }
}
