//! CLI parsing functions and methods.

use std::time::Duration;

use signdrill_core::{ChallengeConfig, ClientConfig, EngineConfig, HoldConfig, Letter};

use super::types::{Cli, Command, LetterList};

/// Parse a single letter, case-insensitively.
pub fn parse_letter(s: &str) -> Result<Letter, String> {
    let trimmed = s.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Letter::new(c.to_ascii_uppercase())),
        _ => Err(format!("expected a single letter, got {:?}", s)),
    }
}

/// Parse a letter pool such as `ABCD`, `a,b,c` or `A B C`.
///
/// Duplicates are dropped later by the challenge configuration.
pub fn parse_letters(s: &str) -> Result<LetterList, String> {
    let letters: Vec<Letter> = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| Letter::new(c.to_ascii_uppercase()))
        .collect();
    if letters.is_empty() {
        return Err("letter pool must not be empty".to_string());
    }
    Ok(LetterList(letters))
}

/// Parse a confidence threshold in `[0, 1]`.
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid threshold {:?}", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be between 0 and 1, got {}", value));
    }
    Ok(value)
}

impl Cli {
    /// Classifier connection settings from the global flags.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone())
            .with_classify_timeout(Duration::from_millis(self.classify_timeout_ms))
            .with_health_timeout(Duration::from_millis(self.health_timeout_ms))
    }

    /// Engine settings for the selected subcommand.
    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::default();
        match &self.command {
            Command::Health => config,
            Command::Recognize(args) => {
                config.with_recognition_interval(Duration::from_millis(args.interval_ms))
            }
            Command::Practice(args) => config
                .with_practice_interval(Duration::from_millis(args.interval_ms))
                .with_hold(
                    HoldConfig::default()
                        .with_hold_duration(Duration::from_millis(args.hold_ms))
                        .with_confidence_threshold(args.threshold),
                ),
            Command::Challenge(args) => {
                let challenge = ChallengeConfig::default()
                    .with_letter_pool(args.letters.0.iter().copied())
                    .with_confidence_threshold(args.threshold)
                    .with_max_failures(args.max_failures);
                let config = config
                    .with_challenge_interval(Duration::from_millis(args.interval_ms))
                    .with_challenge(challenge);
                match args.seed {
                    Some(seed) => config.with_seed(seed),
                    None => config,
                }
            }
        }
    }

    /// Whether the subcommand samples frames.
    pub fn needs_frames(&self) -> bool {
        !matches!(self.command, Command::Health)
    }
}
