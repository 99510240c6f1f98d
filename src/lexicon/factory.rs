//! Lexicon factory for creating sources from configuration.
//!
//! The `kind` string of a lexicon record is resolved once, when resources are
//! assembled, to a [`LexiconKind`]; the factory then builds the matching
//! [`LexiconSource`].
//!
//! # Example
//!
//! ```rust
//! use phonmatch::lexicon::{LexiconFactory, LexiconKind};
//!
//! let kind: LexiconKind = "cmudict".parse().unwrap();
//! assert_eq!(kind, LexiconKind::CmuDict);
//!
//! let source = LexiconFactory::create(kind, "data/cmudict.txt", Some(1000));
//! assert!(source.describe().starts_with("CMU dictionary"));
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::source::{CmuDictSource, JsonExportSource, LexiconSource, WordListSource};

/// Lexicon source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexiconKind {
    /// CMU pronouncing dictionary
    CmuDict,
    /// Tab-separated lemma and definition
    WordList,
    /// Bilingual dictionary JSON export
    JsonExport,
}

impl LexiconKind {
    /// Every kind, with its configuration name.
    pub const ALL: [(LexiconKind, &'static str); 3] = [
        (LexiconKind::CmuDict, "cmudict"),
        (LexiconKind::WordList, "wordlist"),
        (LexiconKind::JsonExport, "json"),
    ];

    /// Configuration name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            LexiconKind::CmuDict => "cmudict",
            LexiconKind::WordList => "wordlist",
            LexiconKind::JsonExport => "json",
        }
    }
}

impl fmt::Display for LexiconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised lexicon kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lexicon kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for LexiconKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
            .map(|&(kind, _)| kind)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Factory for creating lexicon sources of each kind
pub struct LexiconFactory;

impl LexiconFactory {
    /// Create a source of `kind` reading `path`, capped at `limit` records.
    pub fn create(
        kind: LexiconKind,
        path: impl Into<PathBuf>,
        limit: Option<usize>,
    ) -> Box<dyn LexiconSource> {
        let path = path.into();
        match kind {
            LexiconKind::CmuDict => Box::new(CmuDictSource::new(path, limit)),
            LexiconKind::WordList => Box::new(WordListSource::new(path, limit)),
            LexiconKind::JsonExport => Box::new(JsonExportSource::new(path, limit)),
        }
    }
}
