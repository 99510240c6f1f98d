//! phonmatch - Phonetic transduction and approximate lexicon matching
//!
//! Encodes text with configured orthographies and ranks lexicon entries by
//! phonetic distance.

use clap::Parser;
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use phonmatch::cli::commands;
use phonmatch::cli::Cli;

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::execute(cli.command) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
}
