// Copyright 2026 KMFlow Engineering

//! Type-keyed registry mapping a task kind to the handler that executes it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Task, TaskKind};
use crate::error::Result;

use super::worker::WorkerContext;

/// Executes one kind of durable task. Implementations MUST be idempotent
/// keyed by `task_id + stage`, since delivery is at-least-once.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run the task to completion (or to a cooperative cancellation
    /// point), reporting progress via `ctx`.
    async fn handle(&self, task: &Task, ctx: &WorkerContext) -> Result<()>;
}

/// Maps each [`TaskKind`] to the handler that runs it.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<TaskKind, Arc<dyn TaskHandler>>,
}

impl HandlerRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, replacing any previous registration.
    pub fn register(&mut self, kind: TaskKind, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Look up the handler for a task kind.
    #[must_use]
    pub fn handler_for(&self, kind: TaskKind) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl TaskHandler for CountingHandler {
        async fn handle(&self, _task: &Task, _ctx: &WorkerContext) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn registered_handler_is_found_by_kind() {
        let mut registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry.register(TaskKind::Ingest, Arc::new(CountingHandler(counter.clone())));
        assert!(registry.handler_for(TaskKind::Ingest).is_some());
        assert!(registry.handler_for(TaskKind::PovAssemble).is_none());
    }
}
