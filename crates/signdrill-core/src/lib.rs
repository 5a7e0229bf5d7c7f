//! signdrill-core: recognition confirmation and scoring engine.
//!
//! This crate provides:
//! - The classifier boundary and its HTTP client
//! - A single-flight polling scheduler
//! - Hold-to-confirm detection and the challenge game
//! - Screen lifecycle through [`Engine`]
//! - Configuration, errors and logging

pub mod classifier;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frame;
pub mod logging;
pub mod sample;
pub mod scheduler;
pub mod session;

pub use classifier::{Classifier, ClassifierClient};
pub use config::{ChallengeConfig, ClientConfig, EngineConfig, HoldConfig};
pub use engine::{ChallengeScreen, Engine, PracticeScreen, RecognizeScreen, Screen};
pub use error::{ClassificationFailure, Error, Result};
pub use frame::FrameSource;
pub use logging::{init_logging, LogFormat};
pub use sample::{ConfidenceBand, Letter, PredictionSample, RankedLetter};
pub use scheduler::{LinkStatus, PollingScheduler, SampleConsumer, SchedulerHandle};
