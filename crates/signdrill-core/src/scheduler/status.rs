//! Per-screen classifier link status.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::ClassificationFailure;

/// Non-blocking view of how classification calls are going.
///
/// `consecutive_failures` counts network and server failures only; wrong
/// answers in a challenge are tracked by the challenge itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkStatus {
    pub consecutive_failures: u32,
    pub last_failure: Option<ClassificationFailure>,
    pub last_success_at: Option<Instant>,
    pub samples_delivered: u64,
    pub failures_total: u64,
    /// Ticks skipped because a call was in flight or the consumer was idle.
    pub ticks_skipped: u64,
    /// Ticks that produced no frame.
    pub frames_missed: u64,
}

impl LinkStatus {
    pub(crate) fn record_sample(&mut self, now: Instant) {
        self.consecutive_failures = 0;
        self.last_failure = None;
        self.last_success_at = Some(now);
        self.samples_delivered += 1;
    }

    pub(crate) fn record_failure(&mut self, failure: ClassificationFailure) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.failures_total += 1;
        self.last_failure = Some(failure);
    }

    /// True while the most recent call failed.
    pub fn is_degraded(&self) -> bool {
        self.consecutive_failures > 0
    }

    /// Time since the last successful classification.
    pub fn since_last_success(&self, now: Instant) -> Option<Duration> {
        self.last_success_at
            .map(|at| now.saturating_duration_since(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_accumulate_until_success() {
        let mut status = LinkStatus::default();
        status.record_failure(ClassificationFailure::Timeout);
        status.record_failure(ClassificationFailure::Timeout);
        assert_eq!(status.consecutive_failures, 2);
        assert!(status.is_degraded());

        let now = Instant::now();
        status.record_sample(now);
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.last_failure, None);
        assert_eq!(status.failures_total, 2);
        assert_eq!(status.samples_delivered, 1);
        assert!(!status.is_degraded());
        assert_eq!(
            status.since_last_success(now + Duration::from_millis(300)),
            Some(Duration::from_millis(300))
        );
    }

    #[test]
    fn no_success_yet() {
        let status = LinkStatus::default();
        assert_eq!(status.since_last_success(Instant::now()), None);
    }
}
