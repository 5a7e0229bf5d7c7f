//! Client CLI implementation.
//!
//! Provides command-line argument parsing using clap.

mod parsing;
mod types;


pub use parsing::{parse_letter, parse_letters, parse_threshold};
pub use types::*;
