//! Classification results as seen by the engine.

use std::fmt;
use std::str::FromStr;

use crate::constants::{HIGH_CONFIDENCE, MEDIUM_CONFIDENCE};
use crate::Error;

/// A single sign label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(char);

impl Letter {
    pub const fn new(c: char) -> Self {
        Self(c)
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<char> for Letter {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl FromStr for Letter {
    type Err = Error;

    /// Parse a label made of exactly one character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self(c)),
            (None, _) => Err(Error::invalid_config("empty letter")),
            (Some(_), Some(_)) => Err(Error::invalid_config(format!(
                "letter must be a single character, got {:?}",
                s
            ))),
        }
    }
}

/// One entry of the classifier's ranked alternatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedLetter {
    pub letter: Letter,
    pub confidence: f64,
}

/// Result of one classification, exactly as reported by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSample {
    /// Recognized letter, if any.
    pub letter: Option<Letter>,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    /// Whether a hand was found in the frame.
    pub landmarks_detected: bool,
    /// Server-side processing time, when reported.
    pub processing_time_ms: Option<f64>,
    /// Diagnostic text carried on an otherwise successful response.
    pub diagnostic: Option<String>,
    /// Best alternatives, highest confidence first.
    pub top_predictions: Vec<RankedLetter>,
}

impl PredictionSample {
    pub fn new(letter: Option<Letter>, confidence: f64, landmarks_detected: bool) -> Self {
        Self {
            letter,
            confidence,
            landmarks_detected,
            processing_time_ms: None,
            diagnostic: None,
            top_predictions: Vec::new(),
        }
    }

    /// A sample for a frame in which no hand was found.
    pub fn no_hand() -> Self {
        Self::new(None, 0.0, false)
    }

    /// True when a hand was found and the confidence reaches `threshold`.
    ///
    /// The comparison is inclusive.
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.landmarks_detected && self.confidence >= threshold
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }

    /// Confidence as a whole percentage, rounded.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Coarse confidence bucket used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            ConfidenceBand::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}
