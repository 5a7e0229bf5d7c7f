//! Classifier double with scripted outcomes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use signdrill_core::classifier::Classifier;
use signdrill_core::{ClassificationFailure, PredictionSample};

/// What one `classify` call returns.
pub type Outcome = Result<PredictionSample, ClassificationFailure>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct Inner {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<Outcome>,
    latency: Mutex<Duration>,
    healthy: AtomicBool,
    started: AtomicU64,
    completed: AtomicU64,
    in_flight: AtomicU64,
    max_in_flight: AtomicU64,
    frames: Mutex<Vec<Bytes>>,
}

/// A [`Classifier`] that replays queued outcomes.
///
/// Once the queue is empty every call returns the fallback outcome (a
/// no-hand sample unless changed). Clones share state, so a test can keep
/// one clone for inspection and hand another to the engine.
#[derive(Debug, Clone)]
pub struct ScriptedClassifier {
    inner: Arc<Inner>,
}

impl Default for ScriptedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(VecDeque::new()),
                fallback: Mutex::new(Ok(PredictionSample::no_hand())),
                latency: Mutex::new(Duration::ZERO),
                healthy: AtomicBool::new(true),
                started: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                in_flight: AtomicU64::new(0),
                max_in_flight: AtomicU64::new(0),
                frames: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Return `sample` from every call.
    pub fn always(sample: PredictionSample) -> Self {
        let classifier = Self::new();
        classifier.set_fallback(Ok(sample));
        classifier
    }

    /// Return `failure` from every call.
    pub fn failing(failure: ClassificationFailure) -> Self {
        let classifier = Self::new();
        classifier.set_fallback(Err(failure));
        classifier
    }

    /// Delay every call by `latency` (tokio time, so paused clocks apply).
    pub fn with_latency(self, latency: Duration) -> Self {
        *lock(&self.inner.latency) = latency;
        self
    }

    pub fn push(&self, outcome: Outcome) {
        lock(&self.inner.script).push_back(outcome);
    }

    pub fn push_sample(&self, sample: PredictionSample) {
        self.push(Ok(sample));
    }

    pub fn push_failure(&self, failure: ClassificationFailure) {
        self.push(Err(failure));
    }

    pub fn set_fallback(&self, outcome: Outcome) {
        *lock(&self.inner.fallback) = outcome;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.inner.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn calls_started(&self) -> u64 {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub fn calls_completed(&self) -> u64 {
        self.inner.completed.load(Ordering::SeqCst)
    }

    /// Highest number of calls ever in progress at once.
    pub fn max_concurrent(&self) -> u64 {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    /// Frames received so far, in call order.
    pub fn frames_seen(&self) -> Vec<Bytes> {
        lock(&self.inner.frames).clone()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, frame: &[u8]) -> Outcome {
        let inner = &self.inner;
        inner.started.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        lock(&inner.frames).push(Bytes::copy_from_slice(frame));

        let latency = *lock(&inner.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let scripted = lock(&inner.script).pop_front();
        let outcome = scripted.unwrap_or_else(|| lock(&inner.fallback).clone());

        inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        inner.completed.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn probe_health(&self) -> bool {
        self.inner.healthy.load(Ordering::SeqCst)
    }

    fn endpoint(&self) -> String {
        "scripted".to_string()
    }
}
