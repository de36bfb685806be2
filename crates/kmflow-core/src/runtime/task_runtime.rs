// Copyright 2026 KMFlow Engineering

//! The durable task queue: `submit`/`poll`/`cancel` plus the progress and
//! partial-result reporting contract, backed here by an in-memory table.
//! A durable backend (`kmflow-stream`) swaps in behind the same contract
//! in production; this type is also what the in-process test suite uses
//! directly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::domain::{Task, TaskKind, TaskStatus};
use crate::error::{Error, Result};

/// A point-in-time snapshot of a task's state, returned by `poll`.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    /// Current status.
    pub status: TaskStatus,
    /// Fractional completion in `[0, 1]`.
    pub progress: f64,
    /// Most recent error, if any.
    pub last_error: Option<String>,
    /// Result payload, if the task has succeeded or gone partial.
    pub result: Option<Value>,
}

/// The durable task table plus its pending-dispatch queue.
#[derive(Default)]
pub struct TaskRuntime {
    tasks: DashMap<String, Task>,
    pending: parking_lot::Mutex<VecDeque<String>>,
    cancelled: DashMap<String, Arc<AtomicBool>>,
}

impl TaskRuntime {
    /// Construct an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a new task in `Queued` status and append it to the
    /// dispatch queue in the same step, mirroring the outbox pattern used
    /// by the graph writer: submission and enqueue never drift apart.
    pub fn submit(&self, id: impl Into<String>, engagement_id: &str, kind: TaskKind, payload: Value, now: i64) -> String {
        let id = id.into();
        let task = Task::new(id.clone(), engagement_id, kind, payload, now);
        self.tasks.insert(id.clone(), task);
        self.cancelled.insert(id.clone(), Arc::new(AtomicBool::new(false)));
        self.pending.lock().push_back(id.clone());
        id
    }

    /// Pop the next pending task id for dispatch, if any.
    pub fn next_pending(&self) -> Option<String> {
        self.pending.lock().pop_front()
    }

    /// Re-enqueue a task id for redelivery (used after a retryable
    /// failure).
    pub fn requeue(&self, task_id: &str) {
        self.pending.lock().push_back(task_id.to_string());
    }

    /// Current snapshot of a task's state.
    #[must_use]
    pub fn poll(&self, task_id: &str) -> Option<TaskSnapshot> {
        self.tasks.get(task_id).map(|t| TaskSnapshot {
            status: t.status,
            progress: t.progress,
            last_error: t.last_error.clone(),
            result: t.result.clone(),
        })
    }

    /// Flag a task for cooperative cancellation; workers observe this via
    /// the [`crate::runtime::worker::WorkerContext`] they were given.
    pub fn cancel(&self, task_id: &str) -> Result<()> {
        let flag = self
            .cancelled
            .get(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        flag.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// The cancellation flag shared with a worker's context.
    #[must_use]
    pub fn cancellation_flag(&self, task_id: &str) -> Option<Arc<AtomicBool>> {
        self.cancelled.get(task_id).map(|f| f.clone())
    }

    /// Replace the stored task (used by the worker loop after `run_once`).
    pub fn save(&self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    /// Mark a task `Partial`, leaving it inspectable with a result payload.
    pub fn mark_partial(&self, task_id: &str, result: Value, now: i64) -> Result<()> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        task.status = TaskStatus::Partial;
        task.result = Some(result);
        task.updated_at = now;
        Ok(())
    }

    /// Report progress for a task, clamped to monotonically
    /// non-decreasing.
    pub fn report_progress(&self, task_id: &str, fraction: f64) -> Result<()> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
        let clamped = fraction.clamp(0.0, 1.0);
        if clamped > task.progress {
            task.progress = clamped;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submit_queues_the_task_and_enqueues_its_id() {
        let runtime = TaskRuntime::new();
        let id = runtime.submit("t1", "e1", TaskKind::Ingest, json!({}), 0);
        assert_eq!(runtime.next_pending().as_deref(), Some(id.as_str()));
        assert_eq!(runtime.poll(&id).unwrap().status, TaskStatus::Queued);
    }

    #[test]
    fn cancel_flips_the_shared_flag() {
        let runtime = TaskRuntime::new();
        let id = runtime.submit("t1", "e1", TaskKind::Ingest, json!({}), 0);
        runtime.cancel(&id).unwrap();
        assert!(runtime.cancellation_flag(&id).unwrap().load(Ordering::SeqCst));
    }

    #[test]
    fn cancel_on_unknown_task_is_not_found() {
        let runtime = TaskRuntime::new();
        assert!(matches!(runtime.cancel("missing"), Err(Error::NotFound(_))));
    }

    #[test]
    fn progress_reports_never_decrease() {
        let runtime = TaskRuntime::new();
        let id = runtime.submit("t1", "e1", TaskKind::Ingest, json!({}), 0);
        runtime.report_progress(&id, 0.6).unwrap();
        runtime.report_progress(&id, 0.3).unwrap();
        assert!((runtime.poll(&id).unwrap().progress - 0.6).abs() < 1e-9);
    }

    #[test]
    fn mark_partial_leaves_task_inspectable() {
        let runtime = TaskRuntime::new();
        let id = runtime.submit("t1", "e1", TaskKind::Ingest, json!({}), 0);
        runtime.mark_partial(&id, json!({"done": 3}), 1).unwrap();
        let snapshot = runtime.poll(&id).unwrap();
        assert_eq!(snapshot.status, TaskStatus::Partial);
        assert_eq!(snapshot.result, Some(json!({"done": 3})));
    }
}
