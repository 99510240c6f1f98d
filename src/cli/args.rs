//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phonmatch")]
#[command(about = "Phonetic transduction and approximate lexicon matching")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transduce text with one encoding
    Encode {
        /// Configuration file
        config: PathBuf,

        /// Encoding id
        #[arg(short, long)]
        encoding: String,

        /// Text to encode
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Match tokens against the configured lexicons
    Match {
        /// Configuration file
        config: PathBuf,

        /// Read query text from a file, one line at a time
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show the feature specs of each query phone
        #[arg(short, long)]
        phones: bool,

        /// Query text
        text: Vec<String>,
    },

    /// Validate a configuration and report every recorded problem
    Check {
        /// Configuration file
        config: PathBuf,
    },

    /// List the dimensions of a feature set in canonical order
    Features {
        /// Configuration file
        config: PathBuf,

        /// Feature set id
        #[arg(short, long)]
        features: String,
    },
}
