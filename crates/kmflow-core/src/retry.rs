// Copyright 2026 KMFlow Engineering

//! Shared exponential backoff with jitter for retrying transient errors
//! across the ingestion, graph write, and runtime components.

use std::time::Duration;

use rand::Rng;

/// Default initial backoff before the first retry, in milliseconds.
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 200;

/// Default maximum backoff between retries, in seconds.
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 30;

/// Default jitter ratio applied on top of the exponential value.
pub const DEFAULT_JITTER_RATIO: f64 = 0.2;

/// Exponential-backoff-with-jitter policy, doubling the delay on each
/// consecutive failure up to `max`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    jitter_ratio: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(DEFAULT_BACKOFF_INITIAL_MS),
            max: Duration::from_secs(DEFAULT_BACKOFF_MAX_SECS),
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }
}

impl Backoff {
    /// Construct a backoff policy from explicit bounds.
    #[must_use]
    pub fn new(initial: Duration, max: Duration, jitter_ratio: f64) -> Self {
        Self {
            initial,
            max,
            jitter_ratio: jitter_ratio.clamp(0.0, 1.0),
        }
    }

    /// Delay before the `attempt`-th retry (1-indexed), with jitter applied.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.unjittered_delay(attempt);
        if self.jitter_ratio == 0.0 {
            return base;
        }
        let mut rng = rand::thread_rng();
        let jitter_span = base.as_secs_f64() * self.jitter_ratio;
        let jitter = rng.gen_range(-jitter_span..=jitter_span);
        let jittered = (base.as_secs_f64() + jitter).max(0.0);
        Duration::from_secs_f64(jittered)
    }

    /// Delay before the `attempt`-th retry without jitter, for deterministic
    /// assertions.
    #[must_use]
    pub fn unjittered_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let scale = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        self.initial
            .checked_mul(scale as u32)
            .map_or(self.max, |d| d.min(self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_each_attempt_until_capped() {
        let b = Backoff::new(Duration::from_millis(100), Duration::from_secs(1), 0.0);
        assert_eq!(b.unjittered_delay(1), Duration::from_millis(100));
        assert_eq!(b.unjittered_delay(2), Duration::from_millis(200));
        assert_eq!(b.unjittered_delay(3), Duration::from_millis(400));
        assert_eq!(b.unjittered_delay(10), Duration::from_secs(1));
    }

    #[test]
    fn zero_attempt_has_no_delay() {
        let b = Backoff::default();
        assert_eq!(b.unjittered_delay(0), Duration::ZERO);
    }

    #[test]
    fn jittered_delay_stays_within_expected_range() {
        let b = Backoff::new(Duration::from_millis(1000), Duration::from_secs(60), 0.5);
        for _ in 0..50 {
            let d = b.delay_for_attempt(1);
            assert!(d.as_millis() >= 500 && d.as_millis() <= 1500);
        }
    }
}
