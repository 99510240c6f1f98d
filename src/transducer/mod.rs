//! Orthography-to-phonology transduction.
//!
//! An [`Encoding`] is an ordered table of [`EncodingPattern`]s. Each pattern's
//! input template is compiled into a [`PatternAutomaton`], and an [`Encoder`]
//! runs those automata over a token in two passes (replacement, then template
//! overlay) to produce output text and a sequence of phones.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use phonmatch::features::FeatureSet;
//! use phonmatch::transducer::{Encoder, Encoding, EncodingPattern};
//!
//! let features = Arc::new(FeatureSet::from_names(["Cons", "Voice"], 1.0, -1.0));
//! let patterns = vec![
//!     EncodingPattern::new("k", vec![vec![1.0, -1.0]]),
//!     EncodingPattern::new("_'", vec![vec![0.0, 1.0]]),
//! ];
//! let encoder = Encoder::new(Arc::new(Encoding::new("demo", features, patterns)));
//!
//! // "'" only modifies its neighbour
//! assert_eq!(encoder.encode("k'"), vec![vec![1.0, 1.0]]);
//! ```

pub mod automaton;
mod encoder;
mod encoding;
mod pattern;

pub use automaton::{PatternAutomaton, ScanState, Transition, WILDCARD};
pub use encoder::{Encoder, Transduction};
pub use encoding::{Encoding, IPA_ENCODING};
pub use pattern::EncodingPattern;
