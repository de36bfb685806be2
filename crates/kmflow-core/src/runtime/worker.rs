// Copyright 2026 KMFlow Engineering

//! Worker execution: runs one task through its registered handler,
//! checking cancellation at stage boundaries and retrying transient
//! failures with backoff.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::{Task, TaskStatus};
use crate::error::Error;
use crate::retry::Backoff;

use super::registry::HandlerRegistry;

/// Per-task handle a worker passes to its handler: progress reporting and
/// the cooperative cancellation flag.
pub struct WorkerContext {
    task_id: String,
    cancelled: Arc<AtomicBool>,
    progress: Arc<std::sync::atomic::AtomicU32>,
}

impl WorkerContext {
    /// Construct a context for `task_id` sharing `cancelled` with the
    /// runtime's cancellation table.
    #[must_use]
    pub fn new(task_id: impl Into<String>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            task_id: task_id.into(),
            cancelled,
            progress: Arc::new(std::sync::atomic::AtomicU32::new(0)),
        }
    }

    /// The task id this context belongs to.
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Whether the task has been flagged for cooperative cancellation.
    /// Handlers MUST check this between stages.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Report monotonically non-decreasing progress in `[0, 1]`, encoded
    /// as a permille integer to stay lock-free.
    pub fn report(&self, fraction: f64, _stage_label: &str) {
        let permille = (fraction.clamp(0.0, 1.0) * 1000.0) as u32;
        let _ = self
            .progress
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if permille > current {
                    Some(permille)
                } else {
                    None
                }
            });
    }

    /// Last reported progress fraction.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        f64::from(self.progress.load(Ordering::SeqCst)) / 1000.0
    }
}

/// Run `task` through `registry`'s matching handler once, applying the
/// retry/backoff and terminal-status transitions the runtime contract
/// requires. Returns the updated task; the caller persists it.
pub async fn run_once(
    mut task: Task,
    registry: &HandlerRegistry,
    ctx: &WorkerContext,
    max_attempts: u32,
    now: i64,
) -> Task {
    if ctx.is_cancelled() {
        let cancelled = Error::Cancelled(task.id.clone());
        task.record_failure(cancelled.to_string(), max_attempts, now, cancelled.is_retryable());
        return task;
    }

    let Some(handler) = registry.handler_for(task.kind.clone()) else {
        task.record_failure("no handler registered", max_attempts, now, false);
        return task;
    };

    task.status = TaskStatus::Running;
    match handler.handle(&task, ctx).await {
        Ok(()) => task.record_success(serde_json::json!({}), now),
        Err(e) => task.record_failure(e.to_string(), max_attempts, now, e.is_retryable()),
    }
    task
}

/// Backoff delay before the next redelivery attempt for a task that has
/// already failed `attempts` times.
#[must_use]
pub fn next_attempt_delay(backoff: &Backoff, attempts: u32) -> std::time::Duration {
    backoff.delay_for_attempt(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskKind};
    use async_trait::async_trait;

    struct AlwaysFails;

    #[async_trait]
    impl super::super::registry::TaskHandler for AlwaysFails {
        async fn handle(&self, _task: &Task, _ctx: &WorkerContext) -> crate::error::Result<()> {
            Err(Error::Other("boom".into()))
        }
    }

    struct AlwaysSucceeds;

    #[async_trait]
    impl super::super::registry::TaskHandler for AlwaysSucceeds {
        async fn handle(&self, _task: &Task, _ctx: &WorkerContext) -> crate::error::Result<()> {
            Ok(())
        }
    }

    struct AlwaysHitsSeedCycle;

    #[async_trait]
    impl super::super::registry::TaskHandler for AlwaysHitsSeedCycle {
        async fn handle(&self, _task: &Task, _ctx: &WorkerContext) -> crate::error::Result<()> {
            Err(Error::SeedCycle("s1".into()))
        }
    }

    fn task() -> Task {
        Task::new("t1", "e1", TaskKind::Ingest, serde_json::json!({}), 0)
    }

    #[tokio::test]
    async fn cancelled_task_transitions_to_failed_without_running_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register(TaskKind::Ingest, Arc::new(AlwaysSucceeds));
        let cancelled = Arc::new(AtomicBool::new(true));
        let ctx = WorkerContext::new("t1", cancelled);
        let result = run_once(task(), &registry, &ctx, 5, 0).await;
        assert_eq!(result.status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn missing_handler_fails_the_task() {
        let registry = HandlerRegistry::new();
        let ctx = WorkerContext::new("t1", Arc::new(AtomicBool::new(false)));
        let result = run_once(task(), &registry, &ctx, 5, 0).await;
        assert_eq!(result.status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn successful_handler_marks_task_succeeded() {
        let mut registry = HandlerRegistry::new();
        registry.register(TaskKind::Ingest, Arc::new(AlwaysSucceeds));
        let ctx = WorkerContext::new("t1", Arc::new(AtomicBool::new(false)));
        let result = run_once(task(), &registry, &ctx, 5, 0).await;
        assert_eq!(result.status, TaskStatus::Succeeded);
    }

    #[tokio::test]
    async fn failing_handler_under_max_attempts_stays_retryable() {
        let mut registry = HandlerRegistry::new();
        registry.register(TaskKind::Ingest, Arc::new(AlwaysFails));
        let ctx = WorkerContext::new("t1", Arc::new(AtomicBool::new(false)));
        let result = run_once(task(), &registry, &ctx, 5, 0).await;
        assert_eq!(result.status, TaskStatus::Queued);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn structural_error_fails_immediately_despite_remaining_attempts() {
        let mut registry = HandlerRegistry::new();
        registry.register(TaskKind::Ingest, Arc::new(AlwaysHitsSeedCycle));
        let ctx = WorkerContext::new("t1", Arc::new(AtomicBool::new(false)));
        let result = run_once(task(), &registry, &ctx, 5, 0).await;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn progress_reports_never_decrease() {
        let ctx = WorkerContext::new("t1", Arc::new(AtomicBool::new(false)));
        ctx.report(0.5, "stage-a");
        ctx.report(0.2, "stage-b");
        assert!((ctx.progress_fraction() - 0.5).abs() < 1e-9);
        ctx.report(0.9, "stage-c");
        assert!((ctx.progress_fraction() - 0.9).abs() < 1e-9);
    }
}
