// Copyright 2026 KMFlow Engineering

//! The async task runtime: a durable submit/poll/cancel contract, a
//! type-keyed handler registry, cooperative worker cancellation, and the
//! per-engagement concurrency semaphore.

pub mod erasure;
pub mod registry;
pub mod semaphore;
pub mod task_runtime;
pub mod worker;

pub use erasure::{ErasureCascadeState, ErasureStage};
pub use registry::{HandlerRegistry, TaskHandler};
pub use semaphore::EngagementSemaphores;
pub use task_runtime::{TaskRuntime, TaskSnapshot};
pub use worker::{next_attempt_delay, run_once, WorkerContext};
