//! Hold-to-confirm detection for practice.
//!
//! A hold starts with the first qualifying sample for the target letter and
//! completes once the letter has been held continuously for the configured
//! duration. Any non-qualifying sample (or a failed classification) restarts
//! it from zero.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::HoldConfig;
use crate::error::ClassificationFailure;
use crate::sample::{Letter, PredictionSample};
use crate::scheduler::SampleConsumer;

/// Something observable that happened to the hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldEvent {
    Started,
    Interrupted,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HoldSession {
    started_at: Instant,
    last_refresh: Instant,
}

/// Published state of a practice hold.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldSnapshot {
    pub target: Letter,
    pub holding: bool,
    /// In `[0, 100]`.
    pub progress_percent: f64,
    pub completed: bool,
    /// Successful holds since this screen was activated.
    pub completions: u32,
    pub last_sample: Option<PredictionSample>,
    pub last_failure: Option<ClassificationFailure>,
}

/// Tracks how long the target letter has been held.
#[derive(Debug)]
pub struct HoldConfirmation {
    target: Letter,
    config: HoldConfig,
    session: Option<HoldSession>,
    progress_percent: f64,
    completed: bool,
    completions: u32,
    last_sample: Option<PredictionSample>,
    last_failure: Option<ClassificationFailure>,
}

impl HoldConfirmation {
    pub fn new(target: Letter, config: HoldConfig) -> Self {
        Self {
            target,
            config,
            session: None,
            progress_percent: 0.0,
            completed: false,
            completions: 0,
            last_sample: None,
            last_failure: None,
        }
    }

    pub fn target(&self) -> Letter {
        self.target
    }

    pub fn config(&self) -> &HoldConfig {
        &self.config
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn is_holding(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completions(&self) -> u32 {
        self.completions
    }

    /// How long the current hold has lasted at `now`.
    pub fn held_for(&self, now: Instant) -> Option<Duration> {
        self.session
            .map(|session| now.saturating_duration_since(session.started_at))
    }

    /// Whether `sample` counts towards holding the target.
    pub fn qualifies(&self, sample: &PredictionSample) -> bool {
        sample.letter == Some(self.target) && sample.is_confident(self.config.confidence_threshold)
    }

    /// Feed one classification result.
    ///
    /// Ignored once the hold has completed, until [`HoldConfirmation::reset`].
    pub fn observe(&mut self, sample: &PredictionSample, now: Instant) -> Option<HoldEvent> {
        if self.completed {
            return None;
        }

        self.last_sample = Some(sample.clone());
        self.last_failure = None;

        if !self.qualifies(sample) {
            return self.interrupt();
        }

        let started = self.session.is_none();
        if started {
            debug!(target_letter = %self.target, "Hold started");
            self.session = Some(HoldSession {
                started_at: now,
                last_refresh: now,
            });
        }

        match self.refresh(now) {
            Some(event) => Some(event),
            None if started => Some(HoldEvent::Started),
            None => None,
        }
    }

    /// A classification failed; counts as a non-qualifying sample.
    pub fn observe_failure(&mut self, failure: &ClassificationFailure) -> Option<HoldEvent> {
        if self.completed {
            return None;
        }
        self.last_failure = Some(failure.clone());
        self.interrupt()
    }

    /// Recompute progress, completing the hold once its duration has elapsed.
    pub fn refresh(&mut self, now: Instant) -> Option<HoldEvent> {
        let session = self.session.as_mut()?;
        session.last_refresh = now;

        let elapsed = now.saturating_duration_since(session.started_at);
        let hold = self.config.hold_duration;
        self.progress_percent = (elapsed.as_secs_f64() / hold.as_secs_f64() * 100.0).min(100.0);

        if elapsed < hold {
            return None;
        }

        self.session = None;
        self.completed = true;
        self.completions += 1;
        self.progress_percent = 100.0;
        info!(
            target_letter = %self.target,
            held_ms = elapsed.as_millis() as u64,
            completions = self.completions,
            "Hold completed"
        );
        Some(HoldEvent::Completed)
    }

    /// Drop the active hold, if any. No partial credit is kept.
    pub fn interrupt(&mut self) -> Option<HoldEvent> {
        if self.completed {
            return None;
        }
        self.progress_percent = 0.0;
        self.session.take().map(|_| {
            debug!(target_letter = %self.target, "Hold interrupted");
            HoldEvent::Interrupted
        })
    }

    /// Clear the hold and the completed flag so a new attempt can begin.
    pub fn reset(&mut self) {
        self.session = None;
        self.progress_percent = 0.0;
        self.completed = false;
        self.last_sample = None;
        self.last_failure = None;
    }

    /// Switch to a different letter and start over.
    pub fn set_target(&mut self, target: Letter) {
        self.target = target;
        self.reset();
    }

    pub fn snapshot(&self) -> HoldSnapshot {
        HoldSnapshot {
            target: self.target,
            holding: self.session.is_some(),
            progress_percent: self.progress_percent,
            completed: self.completed,
            completions: self.completions,
            last_sample: self.last_sample.clone(),
            last_failure: self.last_failure.clone(),
        }
    }
}

impl SampleConsumer for HoldConfirmation {
    type Snapshot = HoldSnapshot;

    fn on_sample(&mut self, sample: &PredictionSample, now: Instant) {
        self.observe(sample, now);
    }

    fn on_failure(&mut self, failure: &ClassificationFailure, _now: Instant) {
        self.observe_failure(failure);
    }

    fn accepts_samples(&self) -> bool {
        !self.completed
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.session
            .map(|session| session.last_refresh + self.config.refresh_interval)
    }

    fn on_deadline(&mut self, now: Instant) {
        self.refresh(now);
    }

    fn snapshot(&self) -> HoldSnapshot {
        HoldConfirmation::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn sample(letter: char, confidence: f64) -> PredictionSample {
        PredictionSample::new(Some(Letter::new(letter)), confidence, true)
    }

    fn hold_a() -> HoldConfirmation {
        HoldConfirmation::new(Letter::new('A'), HoldConfig::default())
    }

    #[test]
    fn qualifying_sample_starts_hold() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        assert_eq!(hold.observe(&sample('A', 0.9), t0), Some(HoldEvent::Started));
        assert!(hold.is_holding());
        assert_eq!(hold.progress_percent(), 0.0);
        assert_eq!(hold.held_for(t0 + ms(300)), Some(ms(300)));
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        hold.observe(&sample('A', 0.9), t0);
        assert_eq!(hold.observe(&sample('A', 0.9), t0 + ms(500)), None);
        assert!((hold.progress_percent() - 25.0).abs() < 1e-9);
        hold.refresh(t0 + ms(1000));
        assert!((hold.progress_percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn consecutive_samples_complete_exactly_once() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        let mut events = Vec::new();
        for i in 0..4 {
            events.extend(hold.observe(&sample('A', 0.9), t0 + ms(500 * i)));
        }
        events.extend(hold.refresh(t0 + ms(2000)));
        events.extend(hold.refresh(t0 + ms(2050)));
        events.extend(hold.observe(&sample('A', 0.9), t0 + ms(2500)));

        assert_eq!(events, vec![HoldEvent::Started, HoldEvent::Completed]);
        assert!(hold.is_completed());
        assert_eq!(hold.completions(), 1);
        assert_eq!(hold.progress_percent(), 100.0);
        assert!(!hold.accepts_samples());
    }

    #[test]
    fn sample_at_duration_completes() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        hold.observe(&sample('A', 0.9), t0);
        assert_eq!(
            hold.observe(&sample('A', 0.9), t0 + ms(2000)),
            Some(HoldEvent::Completed)
        );
    }

    #[test]
    fn disqualifying_sample_restarts_hold() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        hold.observe(&sample('A', 0.9), t0);
        hold.observe(&sample('A', 0.9), t0 + ms(1500));
        assert_eq!(
            hold.observe(&sample('B', 0.9), t0 + ms(1600)),
            Some(HoldEvent::Interrupted)
        );
        assert_eq!(hold.progress_percent(), 0.0);
        assert!(!hold.is_holding());

        // Completion is now measured from the restart.
        assert_eq!(
            hold.observe(&sample('A', 0.9), t0 + ms(2000)),
            Some(HoldEvent::Started)
        );
        assert_eq!(hold.refresh(t0 + ms(3900)), None);
        assert_eq!(hold.refresh(t0 + ms(4000)), Some(HoldEvent::Completed));
    }

    #[test]
    fn threshold_is_inclusive() {
        let hold = hold_a();
        assert!(hold.qualifies(&sample('A', 0.70)));
        assert!(!hold.qualifies(&sample('A', 0.70 - 1e-6)));
    }

    #[test]
    fn no_landmarks_never_qualifies() {
        let hold = hold_a();
        let sample = PredictionSample::new(Some(Letter::new('A')), 0.99, false);
        assert!(!hold.qualifies(&sample));
        assert!(!hold.qualifies(&PredictionSample::no_hand()));
    }

    #[test]
    fn failure_interrupts() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        hold.observe(&sample('A', 0.9), t0);
        assert_eq!(
            hold.observe_failure(&ClassificationFailure::Timeout),
            Some(HoldEvent::Interrupted)
        );
        assert_eq!(
            hold.snapshot().last_failure,
            Some(ClassificationFailure::Timeout)
        );
    }

    #[test]
    fn reset_allows_new_attempt() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        hold.observe(&sample('A', 0.9), t0);
        hold.refresh(t0 + ms(2000));
        assert!(hold.is_completed());

        hold.reset();
        let once = hold.snapshot();
        hold.reset();
        assert_eq!(hold.snapshot(), once);
        assert!(!once.completed);
        assert_eq!(once.completions, 1);

        assert_eq!(
            hold.observe(&sample('A', 0.9), t0 + ms(3000)),
            Some(HoldEvent::Started)
        );
    }

    #[test]
    fn set_target_switches_letter() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        hold.observe(&sample('A', 0.9), t0);
        hold.set_target(Letter::new('B'));
        assert!(!hold.is_holding());
        assert_eq!(hold.target(), Letter::new('B'));
        assert_eq!(hold.observe(&sample('A', 0.9), t0 + ms(100)), None);
        assert_eq!(
            hold.observe(&sample('B', 0.9), t0 + ms(200)),
            Some(HoldEvent::Started)
        );
    }

    #[test]
    fn refresh_deadline_follows_session() {
        let mut hold = hold_a();
        let t0 = Instant::now();
        assert_eq!(hold.next_deadline(), None);
        hold.observe(&sample('A', 0.9), t0);
        assert_eq!(hold.next_deadline(), Some(t0 + ms(50)));
        hold.on_deadline(t0 + ms(50));
        assert_eq!(hold.next_deadline(), Some(t0 + ms(100)));
        hold.interrupt();
        assert_eq!(hold.next_deadline(), None);
    }
}
