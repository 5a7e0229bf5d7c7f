//! Consumers of the classification stream.
//!
//! This module provides:
//! - Hold-to-confirm detection for practice
//! - The challenge game state machine
//! - Passive recognition
//!
//! All three are plain state machines driven with explicit timestamps; the
//! scheduler feeds them through [`crate::scheduler::SampleConsumer`].

mod challenge;
mod hold;
mod recognition;

pub use challenge::{
    ChallengeEvent, ChallengeRound, ChallengeSnapshot, ChallengeState, ChallengeStateMachine,
    RoundResult,
};
pub use hold::{HoldConfirmation, HoldEvent, HoldSnapshot};
pub use recognition::{RecognitionMonitor, RecognitionSnapshot};
