//! CLI interface for phonmatch
//!
//! Provides command-line utilities for encoding text, matching it against
//! lexicons and validating configurations.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
