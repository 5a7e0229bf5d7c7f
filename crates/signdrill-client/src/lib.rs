//! signdrill-client: command-line trainer for the signdrill engine.
//!
//! Provides:
//! - CLI argument parsing
//! - A frame source replaying a directory of images
//! - One-line status rendering per screen
//! - Runners for the health, recognize, practice and challenge commands

pub mod app;
pub mod cli;
pub mod frames;
pub mod render;

pub use app::{run, shutdown_signal, RunOutcome};
pub use cli::{Cli, Command};
pub use frames::DirectoryFrameSource;
