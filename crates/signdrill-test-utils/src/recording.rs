//! A consumer that records what the scheduler delivers.

use tokio::time::Instant;

use signdrill_core::{ClassificationFailure, PredictionSample, SampleConsumer};

/// Counts published by [`RecordingConsumer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingSnapshot {
    pub samples: usize,
    pub failures: usize,
}

/// Records every sample and failure, optionally refusing new samples.
#[derive(Debug, Default)]
pub struct RecordingConsumer {
    pub samples: Vec<(PredictionSample, Instant)>,
    pub failures: Vec<ClassificationFailure>,
    /// When false, the scheduler skips ticks.
    pub accepting: bool,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self {
            accepting: true,
            ..Self::default()
        }
    }
}

impl SampleConsumer for RecordingConsumer {
    type Snapshot = RecordingSnapshot;

    fn on_sample(&mut self, sample: &PredictionSample, now: Instant) {
        self.samples.push((sample.clone(), now));
    }

    fn on_failure(&mut self, failure: &ClassificationFailure, _now: Instant) {
        self.failures.push(failure.clone());
    }

    fn accepts_samples(&self) -> bool {
        self.accepting
    }

    fn snapshot(&self) -> RecordingSnapshot {
        RecordingSnapshot {
            samples: self.samples.len(),
            failures: self.failures.len(),
        }
    }
}
