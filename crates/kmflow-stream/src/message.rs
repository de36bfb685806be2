// Copyright 2026 KMFlow Engineering

//! The wire envelope carried by every topic, and the five internal topic
//! names the task runtime publishes to and consumes from.

use kmflow_core::domain::TaskKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `evidence.ingested` — triggers quality update, embedding, graph
/// projection.
pub const TOPIC_EVIDENCE_INGESTED: &str = "evidence.ingested";
/// `graph.updated` — triggers a consistency scan.
pub const TOPIC_GRAPH_UPDATED: &str = "graph.updated";
/// `pov.requested` — triggers POV generation.
pub const TOPIC_POV_REQUESTED: &str = "pov.requested";
/// `validation.applied` — triggers confidence recomputation.
pub const TOPIC_VALIDATION_APPLIED: &str = "validation.applied";
/// `erasure.requested` — triggers the GDPR multi-step cascade.
pub const TOPIC_ERASURE_REQUESTED: &str = "erasure.requested";

/// `(task_id, kind, payload)`, the message shape the runtime spec names
/// directly. `attempt` lets a consumer compute this delivery's backoff
/// without consulting the relational `Task` row first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMessage {
    /// Owning engagement; also the partition key.
    pub engagement_id: String,
    /// The `Task` row this message drives.
    pub task_id: String,
    /// Which handler should process this message.
    pub kind: TaskKind,
    /// Opaque, kind-specific input.
    pub payload: Value,
    /// 1-indexed delivery count, used to compute the next backoff delay.
    pub attempt: u32,
}

impl StreamMessage {
    /// The first delivery of a freshly submitted task.
    #[must_use]
    pub fn first_attempt(engagement_id: impl Into<String>, task_id: impl Into<String>, kind: TaskKind, payload: Value) -> Self {
        Self {
            engagement_id: engagement_id.into(),
            task_id: task_id.into(),
            kind,
            payload,
            attempt: 1,
        }
    }

    /// The partition key: `engagement_id`, so every event for one
    /// engagement flows through the same partition and sees a consistent
    /// order, per the ordering guarantee in the concurrency model.
    #[must_use]
    pub fn partition_key(&self) -> &str {
        &self.engagement_id
    }

    /// The next delivery of this message, with `attempt` incremented for
    /// backoff-delay computation by the consumer that nacks it.
    #[must_use]
    pub fn redelivery(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redelivery_increments_attempt_and_preserves_identity() {
        let m = StreamMessage::first_attempt("e1", "t1", TaskKind::Ingest, json!({}));
        let r = m.redelivery();
        assert_eq!(r.attempt, 2);
        assert_eq!(r.task_id, m.task_id);
        assert_eq!(r.engagement_id, m.engagement_id);
    }

    #[test]
    fn partition_key_is_engagement_id() {
        let m = StreamMessage::first_attempt("e1", "t1", TaskKind::Ingest, json!({}));
        assert_eq!(m.partition_key(), "e1");
    }
}
