// Copyright 2026 KMFlow Engineering

//! Per-engagement concurrency limiting: the runtime enforces a maximum
//! number of in-flight tasks per engagement, default 4; excess submissions
//! queue naturally behind the semaphore rather than the stream.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Lazily-created per-engagement semaphores, all sized to the same limit.
#[derive(Debug)]
pub struct EngagementSemaphores {
    max_in_flight: usize,
    by_engagement: DashMap<String, Arc<Semaphore>>,
}

impl EngagementSemaphores {
    /// Construct a table capping every engagement at `max_in_flight`
    /// concurrent tasks.
    #[must_use]
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight,
            by_engagement: DashMap::new(),
        }
    }

    fn semaphore_for(&self, engagement_id: &str) -> Arc<Semaphore> {
        self.by_engagement
            .entry(engagement_id.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_in_flight)))
            .clone()
    }

    /// Acquire a permit for `engagement_id`, waiting if the engagement is
    /// already at its concurrency limit. The returned permit releases the
    /// slot when dropped.
    pub async fn acquire(&self, engagement_id: &str) -> OwnedSemaphorePermit {
        let semaphore = self.semaphore_for(engagement_id);
        semaphore
            .acquire_owned()
            .await
            .expect("semaphore is never closed")
    }

    /// Permits currently available for `engagement_id`, for observability.
    #[must_use]
    pub fn available(&self, engagement_id: &str) -> usize {
        self.semaphore_for(engagement_id).available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permits_are_capped_per_engagement() {
        let semaphores = EngagementSemaphores::new(2);
        let p1 = semaphores.acquire("e1").await;
        let p2 = semaphores.acquire("e1").await;
        assert_eq!(semaphores.available("e1"), 0);
        drop(p1);
        assert_eq!(semaphores.available("e1"), 1);
        drop(p2);
    }

    #[tokio::test]
    async fn engagements_have_independent_limits() {
        let semaphores = EngagementSemaphores::new(1);
        let _p1 = semaphores.acquire("e1").await;
        assert_eq!(semaphores.available("e1"), 0);
        assert_eq!(semaphores.available("e2"), 1);
    }
}
