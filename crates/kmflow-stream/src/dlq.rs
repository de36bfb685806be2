// Copyright 2026 KMFlow Engineering

//! Dead-letter handling: once a message exhausts `retry.max_attempts` it
//! is moved to `<topic>.dlq` with its error context, and the task is
//! marked `FAILED`. Grounded on `dashflow-streaming::dlq`'s `DlqHandler`:
//! a bounded-concurrency fire-and-forget sender backed by a semaphore, and
//! `prometheus` counters registered once via `LazyLock`.

use crate::backends::traits::StreamProducer;
use crate::errors::Result;
use crate::message::StreamMessage;
use prometheus::{register_counter, Counter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tokio::sync::Semaphore;
use tracing::{error, warn};

static DLQ_SENDS_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    register_counter!("kmflow_dlq_sends_total", "Total number of messages sent to a dead-letter topic").expect("metric registration")
});
static DLQ_SEND_FAILURES_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    register_counter!("kmflow_dlq_send_failures_total", "Total number of dead-letter send failures").expect("metric registration")
});
static DLQ_DROPPED_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    register_counter!("kmflow_dlq_dropped_total", "Total number of dead-letter sends dropped due to backpressure").expect("metric registration")
});

const DEFAULT_MAX_CONCURRENT_DLQ_SENDS: usize = 64;

/// A message that exhausted its retry budget, carrying the error context
/// needed for forensic replay.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeadLetter {
    /// The message as last delivered, unmodified.
    pub message: StreamMessage,
    /// The handler error from the final attempt.
    pub error: String,
    /// The attempt count at which the retry budget was exhausted.
    pub final_attempt: u32,
}

/// Writes exhausted messages to a dead-letter topic via any
/// [`StreamProducer`], bounding concurrent in-flight sends so a burst of
/// failures can't spawn unbounded tasks.
pub struct DeadLetterWriter<P: StreamProducer + 'static> {
    producer: Arc<P>,
    send_semaphore: Arc<Semaphore>,
    dropped: Arc<AtomicUsize>,
}

impl<P: StreamProducer + 'static> DeadLetterWriter<P> {
    /// A writer with the default concurrent-send limit.
    #[must_use]
    pub fn new(producer: P) -> Self {
        Self::with_max_concurrent(producer, DEFAULT_MAX_CONCURRENT_DLQ_SENDS)
    }

    /// A writer with a caller-chosen concurrent-send limit.
    #[must_use]
    pub fn with_max_concurrent(producer: P, max_concurrent: usize) -> Self {
        Self {
            producer: Arc::new(producer),
            send_semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Total dead letters dropped because every send slot was saturated.
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Send a dead letter, waiting for a free slot. Use this on the
    /// worker's own exhaustion path, where blocking briefly is acceptable.
    pub async fn send(&self, letter: DeadLetter) -> Result<()> {
        let _permit = self.send_semaphore.acquire().await.expect("semaphore never closed");
        self.do_send(letter).await
    }

    /// Fire-and-forget send: drops the dead letter rather than blocking if
    /// no slot is immediately free, for call sites (e.g. a hot consumer
    /// loop) that cannot afford to stall on DLQ backpressure.
    pub fn send_best_effort(&self, letter: DeadLetter) {
        let Ok(permit) = self.send_semaphore.clone().try_acquire_owned() else {
            DLQ_DROPPED_TOTAL.inc();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(task_id = %letter.message.task_id, "dropped dead letter: DLQ sender saturated");
            return;
        };
        let producer = Arc::clone(&self.producer);
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(err) = producer.send(letter.message.clone()).await {
                DLQ_SEND_FAILURES_TOTAL.inc();
                error!(task_id = %letter.message.task_id, "dead-letter send failed: {err}");
            } else {
                DLQ_SENDS_TOTAL.inc();
            }
        });
    }

    async fn do_send(&self, letter: DeadLetter) -> Result<()> {
        match self.producer.send(letter.message.clone()).await {
            Ok(()) => {
                DLQ_SENDS_TOTAL.inc();
                Ok(())
            }
            Err(err) => {
                DLQ_SEND_FAILURES_TOTAL.inc();
                Err(err)
            }
        }
    }
}
