//! CLI types and struct definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use signdrill_core::constants::DEFAULT_API_URL;
use signdrill_core::Letter;

use super::parsing::{parse_letter, parse_letters, parse_threshold};

/// Log output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for signdrill_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => signdrill_core::LogFormat::Text,
            CliLogFormat::Json => signdrill_core::LogFormat::Json,
        }
    }
}

/// Letters drawn as challenge targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterList(pub Vec<Letter>);

/// Hand-sign recognition trainer.
#[derive(Debug, Parser)]
#[command(
    name = "signdrill",
    version,
    about = "Practice and play with a hand-sign classifier"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the classifier backend
    #[arg(
        long = "api-url",
        env = "SIGNDRILL_API_URL",
        default_value = DEFAULT_API_URL,
        global = true,
        value_name = "URL"
    )]
    pub api_url: String,

    /// Directory of encoded frames (JPEG/PNG), replayed in name order
    #[arg(long = "frames", global = true, value_name = "DIR")]
    pub frames: Option<PathBuf>,

    /// Classification timeout in milliseconds
    #[arg(
        long = "classify-timeout-ms",
        default_value_t = 10_000,
        global = true,
        value_name = "MS"
    )]
    pub classify_timeout_ms: u64,

    /// Health probe timeout in milliseconds
    #[arg(
        long = "health-timeout-ms",
        default_value_t = 5_000,
        global = true,
        value_name = "MS"
    )]
    pub health_timeout_ms: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value = "text", global = true)]
    pub log_format: CliLogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the classifier backend is up
    Health,
    /// Show what the classifier currently sees
    Recognize(RecognizeArgs),
    /// Hold one letter until it is confirmed
    Practice(PracticeArgs),
    /// Sign the shown letter before running out of lives
    Challenge(ChallengeArgs),
}

#[derive(Debug, Args)]
pub struct RecognizeArgs {
    /// Sampling interval in milliseconds
    #[arg(long = "interval-ms", default_value_t = 1500, value_name = "MS")]
    pub interval_ms: u64,
}

#[derive(Debug, Args)]
pub struct PracticeArgs {
    /// Letter to practice
    #[arg(short = 'l', long = "letter", value_parser = parse_letter)]
    pub letter: Letter,

    /// Sampling interval in milliseconds
    #[arg(long = "interval-ms", default_value_t = 500, value_name = "MS")]
    pub interval_ms: u64,

    /// How long the letter must be held, in milliseconds
    #[arg(long = "hold-ms", default_value_t = 2000, value_name = "MS")]
    pub hold_ms: u64,

    /// Minimum confidence for a sample to count (0.0-1.0)
    #[arg(long = "threshold", default_value = "0.7", value_parser = parse_threshold)]
    pub threshold: f64,
}

#[derive(Debug, Args)]
pub struct ChallengeArgs {
    /// Letters to draw targets from, e.g. ABCD or A,B,C
    #[arg(long = "letters", default_value = "ABCD", value_parser = parse_letters)]
    pub letters: LetterList,

    /// Sampling interval in milliseconds
    #[arg(long = "interval-ms", default_value_t = 600, value_name = "MS")]
    pub interval_ms: u64,

    /// Consecutive wrong answers that end the game
    #[arg(long = "max-failures", default_value_t = 3)]
    pub max_failures: u32,

    /// Minimum confidence for a sample to be judged (0.0-1.0)
    #[arg(long = "threshold", default_value = "0.7", value_parser = parse_threshold)]
    pub threshold: f64,

    /// Seed for target selection (random when omitted)
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}
