//! signdrill-test-utils: Test infrastructure for signdrill.
//!
//! Provides:
//! - ScriptedClassifier: Classifier double with queued outcomes and call counters
//! - ScriptedFrames: Frame source that can be switched to failing
//! - RecordingConsumer: SampleConsumer that records everything it is fed
//! - StubServer: Minimal HTTP responder for exercising the real client

mod recording;
mod scripted_classifier;
mod scripted_frames;
mod stub_server;

pub use recording::{RecordingConsumer, RecordingSnapshot};
pub use scripted_classifier::{Outcome, ScriptedClassifier};
pub use scripted_frames::ScriptedFrames;
pub use stub_server::{RecordedRequest, StubServer};

use signdrill_core::{Letter, PredictionSample};

/// A sample with a hand and the given letter.
pub fn letter_sample(letter: char, confidence: f64) -> PredictionSample {
    PredictionSample::new(Some(Letter::new(letter)), confidence, true)
}
