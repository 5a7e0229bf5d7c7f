//! The seam between the scheduler and the state machines it drives.

use tokio::time::Instant;

use crate::error::ClassificationFailure;
use crate::sample::PredictionSample;

/// Receives classification results from a [`super::PollingScheduler`].
///
/// Every method runs inside the scheduler's driver loop, one at a time, so
/// implementations need no locking. `now` is the time of delivery.
pub trait SampleConsumer: Send + 'static {
    /// Derived state published to observers after every mutation.
    type Snapshot: Clone + PartialEq + Send + Sync + 'static;

    /// A classification completed successfully.
    fn on_sample(&mut self, sample: &PredictionSample, now: Instant);

    /// A classification failed. The scheduler keeps running regardless.
    fn on_failure(&mut self, failure: &ClassificationFailure, now: Instant);

    /// False when a terminal condition holds (game over, hold complete,
    /// feedback showing); ticks are skipped while false.
    fn accepts_samples(&self) -> bool {
        true
    }

    /// Next instant at which [`SampleConsumer::on_deadline`] must run.
    ///
    /// Must move forward (or become `None`) once `on_deadline` has run.
    fn next_deadline(&self) -> Option<Instant> {
        None
    }

    /// A deadline returned by `next_deadline` has passed.
    fn on_deadline(&mut self, _now: Instant) {}

    fn snapshot(&self) -> Self::Snapshot;
}
