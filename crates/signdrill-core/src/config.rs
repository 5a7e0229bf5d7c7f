//! Engine and classifier configuration.
//!
//! Every value has a default from [`crate::constants`] and a `with_*`
//! builder. Call `validate()` (the engine and client do this for you) before
//! use.

use std::collections::HashSet;
use std::time::Duration;

use crate::constants::{
    CHALLENGE_INTERVAL, CLASSIFY_TIMEOUT, CONFIDENCE_THRESHOLD, CORRECT_FEEDBACK_HOLD,
    DEFAULT_API_URL, DEFAULT_LETTER_POOL, HEALTH_TIMEOUT, HOLD_DURATION, HOLD_REFRESH_INTERVAL,
    MAX_FAILURES, PRACTICE_INTERVAL, RECOGNITION_INTERVAL, WRONG_FEEDBACK_HOLD,
};
use crate::sample::Letter;
use crate::{Error, Result};

fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::invalid_config(format!(
            "confidence threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

pub(crate) fn validate_nonzero(name: &str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(Error::invalid_config(format!("{} must be non-zero", name)));
    }
    Ok(())
}

/// Connection settings for the remote classifier.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the classifier, e.g. `http://192.168.1.10:8000`.
    pub base_url: String,
    /// Bound on one classification call.
    pub classify_timeout: Duration,
    /// Bound on one liveness probe.
    pub health_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            classify_timeout: CLASSIFY_TIMEOUT,
            health_timeout: HEALTH_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Build the URL of an endpoint below the base URL.
    pub fn endpoint(&self, path: &str) -> Result<reqwest::Url> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        reqwest::Url::parse(&url)
            .map_err(|e| Error::invalid_config(format!("invalid classifier URL {:?}: {}", url, e)))
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            Error::invalid_config(format!("invalid classifier URL {:?}: {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_config(format!(
                "classifier URL must use http or https, got {:?}",
                url.scheme()
            )));
        }
        validate_nonzero("classify timeout", self.classify_timeout)?;
        validate_nonzero("health timeout", self.health_timeout)?;
        Ok(())
    }
}

/// Parameters of hold-to-confirm practice.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldConfig {
    pub confidence_threshold: f64,
    /// Continuous time the target must be held.
    pub hold_duration: Duration,
    /// Progress recomputation interval while a hold is active.
    pub refresh_interval: Duration,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            hold_duration: HOLD_DURATION,
            refresh_interval: HOLD_REFRESH_INTERVAL,
        }
    }
}

impl HoldConfig {
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_hold_duration(mut self, duration: Duration) -> Self {
        self.hold_duration = duration;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.confidence_threshold)?;
        validate_nonzero("hold duration", self.hold_duration)?;
        validate_nonzero("hold refresh interval", self.refresh_interval)?;
        Ok(())
    }
}

/// Parameters of the challenge game.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeConfig {
    /// Letters targets are drawn from.
    pub letter_pool: Vec<Letter>,
    pub confidence_threshold: f64,
    /// Consecutive wrong answers that end the game.
    pub max_failures: u32,
    /// Feedback window after a correct answer.
    pub correct_feedback: Duration,
    /// Feedback window after a wrong answer.
    pub wrong_feedback: Duration,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            letter_pool: DEFAULT_LETTER_POOL.iter().copied().map(Letter::new).collect(),
            confidence_threshold: CONFIDENCE_THRESHOLD,
            max_failures: MAX_FAILURES,
            correct_feedback: CORRECT_FEEDBACK_HOLD,
            wrong_feedback: WRONG_FEEDBACK_HOLD,
        }
    }
}

impl ChallengeConfig {
    /// Set the letter pool. Duplicates are dropped, first occurrence wins.
    pub fn with_letter_pool(mut self, letters: impl IntoIterator<Item = Letter>) -> Self {
        let mut seen = HashSet::new();
        self.letter_pool = letters.into_iter().filter(|l| seen.insert(*l)).collect();
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_max_failures(mut self, max: u32) -> Self {
        self.max_failures = max;
        self
    }

    pub fn with_feedback(mut self, correct: Duration, wrong: Duration) -> Self {
        self.correct_feedback = correct;
        self.wrong_feedback = wrong;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.letter_pool.is_empty() {
            return Err(Error::invalid_config("letter pool is empty"));
        }
        let unique: HashSet<_> = self.letter_pool.iter().collect();
        if unique.len() != self.letter_pool.len() {
            return Err(Error::invalid_config("letter pool contains duplicates"));
        }
        validate_threshold(self.confidence_threshold)?;
        if self.max_failures == 0 {
            return Err(Error::invalid_config("max failures must be at least 1"));
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub practice_interval: Duration,
    pub challenge_interval: Duration,
    pub recognition_interval: Duration,
    pub hold: HoldConfig,
    pub challenge: ChallengeConfig,
    /// Seed for target selection; random when unset.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            practice_interval: PRACTICE_INTERVAL,
            challenge_interval: CHALLENGE_INTERVAL,
            recognition_interval: RECOGNITION_INTERVAL,
            hold: HoldConfig::default(),
            challenge: ChallengeConfig::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_practice_interval(mut self, interval: Duration) -> Self {
        self.practice_interval = interval;
        self
    }

    pub fn with_challenge_interval(mut self, interval: Duration) -> Self {
        self.challenge_interval = interval;
        self
    }

    pub fn with_recognition_interval(mut self, interval: Duration) -> Self {
        self.recognition_interval = interval;
        self
    }

    pub fn with_hold(mut self, hold: HoldConfig) -> Self {
        self.hold = hold;
        self
    }

    pub fn with_challenge(mut self, challenge: ChallengeConfig) -> Self {
        self.challenge = challenge;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_nonzero("practice interval", self.practice_interval)?;
        validate_nonzero("challenge interval", self.challenge_interval)?;
        validate_nonzero("recognition interval", self.recognition_interval)?;
        self.hold.validate()?;
        self.challenge.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.practice_interval, Duration::from_millis(500));
        assert_eq!(config.challenge_interval, Duration::from_millis(600));
        assert_eq!(config.recognition_interval, Duration::from_millis(1500));
        assert_eq!(config.hold.hold_duration, Duration::from_millis(2000));
        assert_eq!(config.challenge.max_failures, 3);
        assert_eq!(config.challenge.letter_pool.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn engine_builder() {
        let config = EngineConfig::new()
            .with_practice_interval(Duration::from_millis(250))
            .with_hold(HoldConfig::default().with_hold_duration(Duration::from_secs(1)))
            .with_seed(7);
        assert_eq!(config.practice_interval, Duration::from_millis(250));
        assert_eq!(config.hold.hold_duration, Duration::from_secs(1));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn letter_pool_dedupes() {
        let config = ChallengeConfig::default()
            .with_letter_pool(['A', 'B', 'A', 'C'].into_iter().map(Letter::new));
        assert_eq!(
            config.letter_pool,
            vec![Letter::new('A'), Letter::new('B'), Letter::new('C')]
        );
    }

    #[test]
    fn rejects_empty_pool() {
        let config = ChallengeConfig::default().with_letter_pool(std::iter::empty());
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(HoldConfig::default()
            .with_confidence_threshold(1.5)
            .validate()
            .is_err());
        assert!(ChallengeConfig::default()
            .with_confidence_threshold(-0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_zero_durations() {
        assert!(HoldConfig::default()
            .with_hold_duration(Duration::ZERO)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_challenge_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_zero_max_failures() {
        assert!(ChallengeConfig::default()
            .with_max_failures(0)
            .validate()
            .is_err());
    }

    #[test]
    fn client_endpoint_joins_paths() {
        let config = ClientConfig::new("http://10.0.0.2:8000/");
        assert_eq!(
            config.endpoint("predict").unwrap().as_str(),
            "http://10.0.0.2:8000/predict"
        );
        let config = ClientConfig::new("http://10.0.0.2:8000/api");
        assert_eq!(
            config.endpoint("health").unwrap().as_str(),
            "http://10.0.0.2:8000/api/health"
        );
    }

    #[test]
    fn client_rejects_bad_urls() {
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("ftp://example.com").validate().is_err());
        assert!(ClientConfig::default().validate().is_ok());
    }
}
