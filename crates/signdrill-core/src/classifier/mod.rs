//! Remote classifier access.
//!
//! The engine only sees the [`Classifier`] trait; [`ClassifierClient`] is the
//! HTTP implementation used in production.

mod client;
mod wire;

use async_trait::async_trait;

use crate::error::ClassificationFailure;
use crate::sample::PredictionSample;

pub use client::ClassifierClient;
pub use wire::decode_prediction;

/// Black-box classification service.
///
/// Implementations must not retry internally; the scheduler retries on its
/// next tick.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one encoded frame.
    async fn classify(&self, frame: &[u8]) -> Result<PredictionSample, ClassificationFailure>;

    /// Lightweight liveness check. Never fails; any problem yields `false`.
    async fn probe_health(&self) -> bool;

    /// Where the classifier lives, for error messages and logs.
    fn endpoint(&self) -> String {
        "classifier".to_string()
    }
}
