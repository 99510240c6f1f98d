//! Typed configuration.
//!
//! A configuration is a single JSON document (camelCase keys) describing the
//! feature sets, encodings, lexicons, hypothesis tables and matcher settings of
//! a run. Every record is validated once, when it is deserialized; unknown keys
//! are rejected. Feature sets and encodings may live in separate files, named
//! by `{ "path": "..." }` relative to the configuration file.
//!
//! Reference problems (an encoding naming an unknown feature set, a lexicon of
//! an unknown kind, ...) are not raised here. [`Resources`] records them while
//! it assembles the object graph.
//!
//! # Example
//!
//! ```rust
//! use phonmatch::config::Config;
//!
//! let config: Config = serde_json::from_str(r#"{
//!     "featureSets": [{ "id": "phon", "features": ["cons", "voice"] }],
//!     "encodings": [{
//!         "id": "latin",
//!         "features": "phon",
//!         "patterns": [{ "input": "th", "output": "θ", "features": ["+cons", "-voice"] }]
//!     }],
//!     "matcher": { "lexicons": [], "options": 50 }
//! }"#).unwrap();
//!
//! assert_eq!(config.matcher.unwrap().option_count(), 20);
//! ```

mod resources;

pub use resources::Resources;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of options emitted per token.
pub const DEFAULT_OPTION_COUNT: usize = 6;

/// Upper bound on the number of options emitted per token.
pub const MAX_OPTION_COUNT: usize = 20;

/// Upper bound on consonant copies added by expansion.
pub const MAX_CONSONANT_COPIES: usize = 2;

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Feature sets, inline or by path
    #[serde(default)]
    pub feature_sets: Vec<Included<FeatureSetConfig>>,
    /// Encodings, inline or by path
    #[serde(default)]
    pub encodings: Vec<Included<EncodingConfig>>,
    /// Lexicons to match against
    #[serde(default)]
    pub lexicons: Vec<LexiconConfig>,
    /// Curated hypothesis tables
    #[serde(default)]
    pub hypotheses: Vec<HypothesisConfig>,
    /// Matcher settings
    #[serde(default)]
    pub matcher: Option<MatcherConfig>,
    /// How query text is tokenized and encoded
    #[serde(default)]
    pub input: Option<InputConfig>,
}

impl Config {
    /// Read a configuration document from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }
}

/// Reference to a record stored in another file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileRef {
    /// Path relative to the referencing configuration file
    pub path: PathBuf,
}

/// A record given either inline or as a [`FileRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Included<T> {
    /// Stored in a separate JSON file
    File(FileRef),
    /// Given inline
    Inline(T),
}

impl<T: DeserializeOwned + Clone> Included<T> {
    /// Produce the record, reading it from `base_dir` if needed.
    pub fn resolve(&self, base_dir: &Path) -> Result<T> {
        match self {
            Included::Inline(value) => Ok(value.clone()),
            Included::File(file) => read_json(&base_dir.join(&file.path)),
        }
    }
}

/// A feature set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureSetConfig {
    /// Identifier referenced by encodings
    pub id: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Value of `+Name` (default 1)
    #[serde(default)]
    pub plus_value: Option<f64>,
    /// Value of `-Name` (default -1)
    #[serde(default)]
    pub minus_value: Option<f64>,
    /// Value of unmentioned dimensions (default: midpoint)
    #[serde(default)]
    pub unset_value: Option<f64>,
    /// Comma-joined alias groups, one per dimension
    pub features: Vec<String>,
}

/// An encoding: an ordered table of patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EncodingConfig {
    /// Identifier; `ipa` (any case) marks the encoding used to resolve IPA strings
    pub id: String,
    /// Feature set identifier
    pub features: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Patterns, in any order
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
}

/// One orthography-to-phonology rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatternConfig {
    /// Template; `_` marks the single wildcard of a template pattern
    #[serde(default)]
    pub input: String,
    /// Replacement text (defaults to the matched text)
    #[serde(default)]
    pub output: Option<String>,
    /// Secondary transliteration
    #[serde(default)]
    pub repr: Option<String>,
    /// Literal phones
    #[serde(default)]
    pub features: Option<PhoneSpec>,
    /// Phones derived by encoding this string with the `ipa` encoding
    #[serde(default)]
    pub ipa: Option<String>,
}

/// Feature specs for one phone or for several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhoneSpec {
    /// `["+cons", "-voice"]`: a single phone
    Single(Vec<String>),
    /// `[["+cons"], ["-cons"]]`: one list per phone
    Multiple(Vec<Vec<String>>),
}

impl PhoneSpec {
    /// Spec lists, one per phone.
    pub fn phones(&self) -> Vec<&[String]> {
        match self {
            PhoneSpec::Single(specs) => vec![specs.as_slice()],
            PhoneSpec::Multiple(phones) => phones.iter().map(Vec::as_slice).collect(),
        }
    }
}

/// A lexicon to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LexiconConfig {
    /// Identifier referenced by the matcher
    pub id: String,
    /// Source format, resolved through the lexicon factory
    pub kind: String,
    /// Lexicon file, relative to the configuration file
    pub path: PathBuf,
    /// Encoding applied to each entry's spelling
    pub encoding: String,
    /// Maximum number of records to read
    #[serde(default)]
    pub limit: Option<usize>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// A table of curated readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HypothesisConfig {
    /// Identifier referenced by the matcher
    pub id: String,
    /// Encoding used to give hypothesis lemmas phones
    #[serde(default)]
    pub encoding: Option<String>,
    /// Groups of entries
    #[serde(default)]
    pub groups: Vec<HypothesisGroupConfig>,
}

/// A named group of hypotheses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HypothesisGroupConfig {
    /// Group name
    #[serde(default)]
    pub name: Option<String>,
    /// Entries of the group
    #[serde(default)]
    pub entries: Vec<HypothesisEntryConfig>,
}

/// One hypothesis: the raw token(s) it explains and the proposed reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HypothesisEntryConfig {
    /// Raw token or tokens
    pub input: OneOrMany,
    /// Proposed reading
    pub lemma: String,
    /// Gloss
    #[serde(default)]
    pub definition: Option<String>,
}

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// One string
    One(String),
    /// Several strings
    Many(Vec<String>),
}

impl OneOrMany {
    /// The strings, in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            OneOrMany::One(one) => std::slice::from_ref(one),
            OneOrMany::Many(many) => many,
        };
        items.iter().map(String::as_str)
    }
}

/// Matcher settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatcherConfig {
    /// Lexicon identifiers, searched in this order
    #[serde(default)]
    pub lexicons: Vec<String>,
    /// Options per token (default 6, clamped to 1..=20)
    #[serde(default)]
    pub options: Option<usize>,
    /// DTW band tolerance (default 0, clamped to 0..=1)
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Hypothesis table identifier
    #[serde(default)]
    pub hypotheses: Option<String>,
    /// Feature name marking consonantal phones for expansion
    #[serde(default)]
    pub consonantal: Option<String>,
    /// Extra copies of each consonantal phone (0..=2, default 1 when `consonantal` is set)
    #[serde(default)]
    pub consonant_copies: Option<usize>,
}

impl MatcherConfig {
    /// Options per token, clamped.
    pub fn option_count(&self) -> usize {
        self.options
            .unwrap_or(DEFAULT_OPTION_COUNT)
            .clamp(1, MAX_OPTION_COUNT)
    }

    /// Band tolerance, clamped.
    pub fn tolerance(&self) -> f64 {
        match self.tolerance {
            Some(t) if t.is_finite() => t.clamp(0.0, 1.0),
            Some(t) if t == f64::INFINITY => 1.0,
            _ => 0.0,
        }
    }

    /// Consonant copies, clamped.
    pub fn consonant_copies(&self) -> usize {
        self.consonant_copies.unwrap_or(1).min(MAX_CONSONANT_COPIES)
    }
}

/// Query input settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InputConfig {
    /// Encoding applied to query tokens
    pub encoding: String,
    /// Characters that separate tokens besides whitespace
    #[serde(default)]
    pub delimiters: Option<String>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::json(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_spec_shapes() {
        let single: PhoneSpec = serde_json::from_str(r#"["+cons", "-voice"]"#).unwrap();
        assert_eq!(single.phones().len(), 1);

        let multiple: PhoneSpec = serde_json::from_str(r#"[["+cons"], ["-cons"]]"#).unwrap();
        assert_eq!(multiple.phones().len(), 2);

        let empty: PhoneSpec = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, PhoneSpec::Single(vec![]));
    }

    #[test]
    fn test_included_inline_and_file() {
        let inline: Included<FeatureSetConfig> =
            serde_json::from_str(r#"{ "id": "f", "features": ["a"] }"#).unwrap();
        assert!(matches!(inline, Included::Inline(_)));

        let file: Included<FeatureSetConfig> =
            serde_json::from_str(r#"{ "path": "features.json" }"#).unwrap();
        assert_eq!(
            file,
            Included::File(FileRef {
                path: PathBuf::from("features.json")
            })
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result: std::result::Result<PatternConfig, _> =
            serde_json::from_str(r#"{ "input": "a", "feature": ["+cons"] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_matcher_clamping() {
        let config = MatcherConfig {
            options: Some(0),
            tolerance: Some(3.5),
            consonant_copies: Some(7),
            ..Default::default()
        };
        assert_eq!(config.option_count(), 1);
        assert_eq!(config.tolerance(), 1.0);
        assert_eq!(config.consonant_copies(), 2);

        let defaults = MatcherConfig::default();
        assert_eq!(defaults.option_count(), DEFAULT_OPTION_COUNT);
        assert_eq!(defaults.tolerance(), 0.0);
    }

    #[test]
    fn test_hypothesis_input_forms() {
        let entry: HypothesisEntryConfig =
            serde_json::from_str(r#"{ "input": ["daiin", "dain"], "lemma": "dayin" }"#).unwrap();
        assert_eq!(entry.input.iter().collect::<Vec<_>>(), vec!["daiin", "dain"]);

        let entry: HypothesisEntryConfig =
            serde_json::from_str(r#"{ "input": "qokedy", "lemma": "kokedi" }"#).unwrap();
        assert_eq!(entry.input.iter().collect::<Vec<_>>(), vec!["qokedy"]);
    }
}
