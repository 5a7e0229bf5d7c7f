//! Passive recognition: show whatever the classifier currently sees.

use tokio::time::Instant;

use crate::error::ClassificationFailure;
use crate::sample::PredictionSample;
use crate::scheduler::SampleConsumer;

/// Published state of the recognize screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionSnapshot {
    /// Most recent successful classification.
    pub latest: Option<PredictionSample>,
    /// User-facing text for the most recent failure, cleared by the next
    /// success.
    pub failure_message: Option<String>,
    pub samples_seen: u64,
    pub failures_seen: u64,
}

/// Keeps the latest sample and surfaces failures directly. Never terminal.
#[derive(Debug, Default)]
pub struct RecognitionMonitor {
    latest: Option<PredictionSample>,
    last_failure: Option<ClassificationFailure>,
    samples_seen: u64,
    failures_seen: u64,
}

impl RecognitionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&PredictionSample> {
        self.latest.as_ref()
    }

    pub fn last_failure(&self) -> Option<&ClassificationFailure> {
        self.last_failure.as_ref()
    }

    pub fn observe(&mut self, sample: &PredictionSample) {
        self.latest = Some(sample.clone());
        self.last_failure = None;
        self.samples_seen += 1;
    }

    pub fn observe_failure(&mut self, failure: &ClassificationFailure) {
        self.last_failure = Some(failure.clone());
        self.failures_seen += 1;
    }

    pub fn snapshot(&self) -> RecognitionSnapshot {
        RecognitionSnapshot {
            latest: self.latest.clone(),
            failure_message: self.last_failure.as_ref().map(|f| f.user_message()),
            samples_seen: self.samples_seen,
            failures_seen: self.failures_seen,
        }
    }
}

impl SampleConsumer for RecognitionMonitor {
    type Snapshot = RecognitionSnapshot;

    fn on_sample(&mut self, sample: &PredictionSample, _now: Instant) {
        self.observe(sample);
    }

    fn on_failure(&mut self, failure: &ClassificationFailure, _now: Instant) {
        self.observe_failure(failure);
    }

    fn snapshot(&self) -> RecognitionSnapshot {
        RecognitionMonitor::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Letter;

    #[test]
    fn failure_is_surfaced_until_next_success() {
        let mut monitor = RecognitionMonitor::new();
        monitor.observe_failure(&ClassificationFailure::Timeout);
        assert_eq!(
            monitor.snapshot().failure_message.as_deref(),
            Some("Request timed out. Check your connection.")
        );

        monitor.observe(&PredictionSample::new(Some(Letter::new('C')), 0.6, true));
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.failure_message, None);
        assert_eq!(snapshot.samples_seen, 1);
        assert_eq!(snapshot.failures_seen, 1);
        assert_eq!(
            snapshot.latest.and_then(|s| s.letter),
            Some(Letter::new('C'))
        );
    }

    #[test]
    fn server_message_is_shown_verbatim() {
        let mut monitor = RecognitionMonitor::new();
        monitor.observe_failure(&ClassificationFailure::Server {
            message: "model not loaded".into(),
        });
        assert_eq!(
            monitor.snapshot().failure_message.as_deref(),
            Some("model not loaded")
        );
    }

    #[test]
    fn latest_sample_kept_across_failures() {
        let mut monitor = RecognitionMonitor::new();
        monitor.observe(&PredictionSample::no_hand());
        monitor.observe_failure(&ClassificationFailure::Transport {
            message: "refused".into(),
        });
        assert!(monitor.latest().is_some());
        assert!(monitor.accepts_samples());
    }
}
