//! Lexicons: the search space of the matcher.
//!
//! A [`Lexicon`] pairs a [`LexiconSource`] with the [`Encoder`] that gives its
//! entries phones. Entries are materialised once, on first access, and then
//! stay fixed for the rest of the run. Lemmas are unique: a second entry with
//! the same lemma is reported and skipped.

pub mod factory;
pub mod source;

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

use crate::error::{self, ConfigIssue, ErrorRecord};
use crate::features::FeatureVector;
use crate::transducer::Encoder;

pub use factory::{LexiconFactory, LexiconKind};
pub use source::{CmuDictSource, JsonExportSource, LexiconSource, MemorySource, WordListSource};

/// Progress is logged every this many entries.
const PROGRESS_INTERVAL: usize = 1000;

/// One word of a lexicon.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    /// Unique key
    pub lemma: String,
    /// Display text
    pub text: String,
    /// Gloss, possibly several lines
    pub definition: Option<String>,
    /// Phones of the entry's spelling
    pub phones: Vec<FeatureVector>,
}

impl LexiconEntry {
    /// Create an entry with explicit phones.
    pub fn new(lemma: impl Into<String>, phones: Vec<FeatureVector>) -> Self {
        let lemma = lemma.into();
        Self {
            text: lemma.clone(),
            lemma,
            definition: None,
            phones,
        }
    }

    /// Create an entry whose phones come from transducing `spelling`.
    pub fn encoded(lemma: impl Into<String>, spelling: &str, encoder: &Encoder) -> Self {
        Self::new(lemma, encoder.encode(spelling))
    }

    /// Set the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the gloss.
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into()).filter(|d: &String| !d.is_empty());
        self
    }
}

#[derive(Debug, Default)]
struct Loaded {
    entries: Vec<Arc<LexiconEntry>>,
    by_lemma: FxHashMap<String, usize>,
    errors: Vec<ErrorRecord>,
}

/// An ordered, lazily loaded collection of [`LexiconEntry`]s.
pub struct Lexicon {
    name: String,
    encoder: Arc<Encoder>,
    source: Box<dyn LexiconSource>,
    loaded: OnceLock<Loaded>,
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("name", &self.name)
            .field("encoding", &self.encoder.encoding().name())
            .field("loaded", &self.loaded.get().map(|l| l.entries.len()))
            .finish()
    }
}

impl Lexicon {
    /// Create a lexicon reading from `source`. Nothing is read until first access.
    pub fn new(
        name: impl Into<String>,
        encoder: Arc<Encoder>,
        source: Box<dyn LexiconSource>,
    ) -> Self {
        Self {
            name: name.into(),
            encoder,
            source,
            loaded: OnceLock::new(),
        }
    }

    /// Create a lexicon over entries built in memory.
    pub fn from_entries(
        name: impl Into<String>,
        encoder: Arc<Encoder>,
        entries: Vec<LexiconEntry>,
    ) -> Self {
        Self::new(name, encoder, Box::new(MemorySource::new(entries)))
    }

    /// Identifier of this lexicon.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoder used for the entries' spellings.
    pub fn encoder(&self) -> &Arc<Encoder> {
        &self.encoder
    }

    /// Entries in source order, loading them if needed.
    pub fn entries(&self) -> &[Arc<LexiconEntry>] {
        &self.load().entries
    }

    /// Entry with the given lemma.
    pub fn get(&self, lemma: &str) -> Option<&Arc<LexiconEntry>> {
        let loaded = self.load();
        loaded.by_lemma.get(lemma).map(|&i| &loaded.entries[i])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// True if the lexicon has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// True once entries have been materialised.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Problems recorded while loading, loading first if needed.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.load().errors
    }

    fn load(&self) -> &Loaded {
        self.loaded.get_or_init(|| self.materialize())
    }

    fn materialize(&self) -> Loaded {
        let owner = format!("lexicon '{}'", self.name);
        let mut loaded = Loaded::default();

        tracing::info!(lexicon = %self.name, source = %self.source.describe(), "loading lexicon");

        let mut issues = Vec::new();
        let entries = match self.source.load(&self.encoder, &mut issues) {
            Ok(entries) => entries,
            Err(e) => {
                issues.push(ConfigIssue::LexiconLoad(e.to_string()));
                Vec::new()
            }
        };
        for issue in issues {
            error::record(&mut loaded.errors, &owner, issue);
        }

        for entry in entries {
            if loaded.by_lemma.contains_key(&entry.lemma) {
                error::record(
                    &mut loaded.errors,
                    &owner,
                    ConfigIssue::DuplicateLemma(entry.lemma.clone()),
                );
                continue;
            }

            loaded
                .by_lemma
                .insert(entry.lemma.clone(), loaded.entries.len());
            loaded.entries.push(Arc::new(entry));

            if loaded.entries.len() % PROGRESS_INTERVAL == 0 {
                tracing::info!(lexicon = %self.name, "  loaded {} entries", loaded.entries.len());
            }
        }

        tracing::info!(lexicon = %self.name, "loaded {} total entries", loaded.entries.len());
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSet;
    use crate::transducer::{Encoding, EncodingPattern};

    fn encoder() -> Arc<Encoder> {
        let features = Arc::new(FeatureSet::from_names(["cons"], 1.0, -1.0));
        let patterns = vec![
            EncodingPattern::new("k", vec![vec![1.0]]),
            EncodingPattern::new("a", vec![vec![-1.0]]),
        ];
        Arc::new(Encoder::new(Arc::new(Encoding::new("test", features, patterns))))
    }

    #[test]
    fn test_lazy_materialisation() {
        let enc = encoder();
        let entry = LexiconEntry::encoded("KA", "ka", &enc);
        let lexicon = Lexicon::from_entries("mem", enc, vec![entry]);

        assert!(!lexicon.is_loaded());
        assert_eq!(lexicon.len(), 1);
        assert!(lexicon.is_loaded());
        assert_eq!(lexicon.get("KA").unwrap().phones, vec![vec![1.0], vec![-1.0]]);
        assert!(lexicon.get("KAK").is_none());
    }

    #[test]
    fn test_duplicate_lemma_is_reported_and_skipped() {
        let enc = encoder();
        let entries = vec![
            LexiconEntry::encoded("KA", "ka", &enc).with_definition("first"),
            LexiconEntry::encoded("AK", "ak", &enc),
            LexiconEntry::encoded("KA", "kak", &enc).with_definition("second"),
        ];
        let lexicon = Lexicon::from_entries("mem", enc, entries);

        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.get("KA").unwrap().definition.as_deref(), Some("first"));
        assert_eq!(lexicon.errors().len(), 1);
        assert_eq!(
            lexicon.errors()[0].to_string(),
            "lexicon 'mem': duplicate lemma 'KA'"
        );
    }

    #[test]
    fn test_load_failure_is_recorded() {
        let lexicon = Lexicon::new(
            "cmu",
            encoder(),
            Box::new(CmuDictSource::new("/nonexistent/cmudict.txt", None)),
        );
        assert!(lexicon.is_empty());
        assert_eq!(lexicon.errors().len(), 1);
        assert!(lexicon.errors()[0]
            .to_string()
            .starts_with("lexicon 'cmu': unable to load lexicon: unable to read"));
    }

    #[test]
    fn test_entry_builders() {
        let entry = LexiconEntry::new("x", vec![])
            .with_text("ex")
            .with_definition("");
        assert_eq!(entry.text, "ex");
        assert_eq!(entry.definition, None);
    }
}
