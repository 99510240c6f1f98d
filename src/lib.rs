//! # phonmatch
//!
//! Phonetic transduction of free-form orthography and approximate matching
//! against reference lexicons.
//!
//! Text in an arbitrary orthography is transduced into a sequence of
//! phonological feature vectors by an [`Encoder`](transducer::Encoder),
//! which compiles declarative orthography-to-phonology rules into character
//! automata. A [`Matcher`](matcher::Matcher) then ranks the entries of one or
//! more lexicons by banded dynamic-time-warping distance over those vectors.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use phonmatch::prelude::*;
//!
//! let features = Arc::new(FeatureSet::from_names(["Cons", "Voice"], 1.0, -1.0));
//! let encoding = Encoding::new("latin", features, vec![
//!     EncodingPattern::new("th", vec![vec![1.0, -1.0]]).with_output("θ"),
//!     EncodingPattern::new("a", vec![vec![-1.0, 1.0]]),
//! ]);
//! let encoder = Arc::new(Encoder::new(Arc::new(encoding)));
//!
//! let lexicon = Lexicon::from_entries("words", Arc::clone(&encoder), vec![
//!     LexiconEntry::encoded("tha", "tha", &encoder),
//!     LexiconEntry::encoded("a", "a", &encoder),
//! ]);
//! let mut matcher = Matcher::new(vec![Arc::new(lexicon)]).with_option_count(1);
//!
//! let query = encoder.text_and_phones("tha");
//! assert_eq!(query.text, "θa");
//!
//! let options = matcher.match_token("tha", &query.phones);
//! assert_eq!(options[0].text(), "tha");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod distance;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod matcher;
pub mod text;
pub mod transducer;

/// CLI interface and utilities
#[cfg(feature = "cli")]
pub mod cli;

pub use error::{ConfigIssue, Error, ErrorRecord, Result};

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::config::{Config, Resources};
    pub use crate::distance::{euclidean_distance, sequence_distance};
    pub use crate::error::{ConfigIssue, Error, ErrorRecord, Result};
    pub use crate::features::{FeatureSet, FeatureVector};
    pub use crate::lexicon::{Lexicon, LexiconEntry, LexiconSource};
    pub use crate::matcher::{HypothesisTable, MatchKind, MatchOption, Matcher};
    pub use crate::text::tokenize;
    pub use crate::transducer::{Encoder, Encoding, EncodingPattern, Transduction};
}
