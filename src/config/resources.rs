//! Assembling the configured object graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{self, ConfigIssue, ErrorRecord, Result};
use crate::features::{FeatureSet, DEFAULT_MINUS_VALUE, DEFAULT_PLUS_VALUE};
use crate::lexicon::{Lexicon, LexiconFactory, LexiconKind};
use crate::matcher::{ConsonantExpansion, HypothesisTable, Matcher};
use crate::text::DEFAULT_DELIMITERS;
use crate::transducer::{Encoder, Encoding, IPA_ENCODING};

use super::{Config, EncodingConfig, InputConfig, MatcherConfig};

const OWNER: &str = "configuration";

/// Feature sets, encodings, lexicons and hypothesis tables built from a
/// [`Config`].
///
/// Assembly never fails on a bad reference: an encoding naming an unknown
/// feature set, a lexicon of an unknown kind and the like are recorded in
/// [`errors`](Self::errors) and the offending object is left out. Children
/// keep their own records; [`all_errors`](Self::all_errors) gathers them.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use phonmatch::config::{Config, Resources};
///
/// let config: Config = serde_json::from_str(r#"{
///     "featureSets": [{ "id": "phon", "features": ["cons", "voice"] }],
///     "encodings": [
///         { "id": "ipa", "features": "phon", "patterns": [
///             { "input": "θ", "features": ["+cons", "-voice"] }
///         ]},
///         { "id": "latin", "features": "phon", "patterns": [
///             { "input": "th", "ipa": "θ" }
///         ]}
///     ],
///     "input": { "encoding": "latin" }
/// }"#).unwrap();
///
/// let resources = Resources::from_config(&config, Path::new("."));
/// assert!(resources.errors().is_empty());
///
/// let encoder = resources.input_encoder().unwrap();
/// assert_eq!(encoder.encode("th"), vec![vec![1.0, -1.0]]);
/// ```
#[derive(Debug)]
pub struct Resources {
    base_dir: PathBuf,
    feature_sets: Vec<Arc<FeatureSet>>,
    encoders: Vec<Arc<Encoder>>,
    lexicons: Vec<Arc<Lexicon>>,
    hypotheses: Vec<Arc<HypothesisTable>>,
    matcher: Option<MatcherConfig>,
    input: Option<InputConfig>,
    errors: Vec<ErrorRecord>,
}

impl Resources {
    /// Read the configuration at `path` and assemble it.
    ///
    /// Relative paths inside the configuration resolve against the directory
    /// holding `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::from_path(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::from_config(&config, base_dir))
    }

    /// Assemble `config`, resolving relative paths against `base_dir`.
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        let mut resources = Self {
            base_dir: base_dir.to_path_buf(),
            feature_sets: Vec::new(),
            encoders: Vec::new(),
            lexicons: Vec::new(),
            hypotheses: Vec::new(),
            matcher: config.matcher.clone(),
            input: config.input.clone(),
            errors: Vec::new(),
        };

        resources.build_feature_sets(config);
        resources.build_encodings(config);
        resources.build_lexicons(config);
        resources.build_hypotheses(config);
        resources.check_matcher();
        resources.check_input();

        tracing::debug!(
            feature_sets = resources.feature_sets.len(),
            encodings = resources.encoders.len(),
            lexicons = resources.lexicons.len(),
            hypotheses = resources.hypotheses.len(),
            errors = resources.errors.len(),
            "assembled resources"
        );
        resources
    }

    fn record(&mut self, owner: &str, issue: ConfigIssue) {
        error::record(&mut self.errors, owner, issue);
    }

    fn build_feature_sets(&mut self, config: &Config) {
        for included in &config.feature_sets {
            let fs = match included.resolve(&self.base_dir) {
                Ok(fs) => fs,
                Err(e) => {
                    self.record(OWNER, ConfigIssue::Load(e.to_string()));
                    continue;
                }
            };
            if self.feature_set(&fs.id).is_some() {
                self.record(
                    OWNER,
                    ConfigIssue::Load(format!("duplicate feature set id '{}'", fs.id)),
                );
                continue;
            }

            tracing::debug!(id = %fs.id, dimensions = fs.features.len(), "building feature set");
            self.feature_sets.push(Arc::new(FeatureSet::build(
                &fs.id,
                &fs.features,
                fs.plus_value.unwrap_or(DEFAULT_PLUS_VALUE),
                fs.minus_value.unwrap_or(DEFAULT_MINUS_VALUE),
                fs.unset_value,
            )));
        }
    }

    fn build_encodings(&mut self, config: &Config) {
        let mut configs: Vec<EncodingConfig> = Vec::new();
        for included in &config.encodings {
            match included.resolve(&self.base_dir) {
                Ok(enc) => configs.push(enc),
                Err(e) => self.record(OWNER, ConfigIssue::Load(e.to_string())),
            }
        }

        // The IPA encoding resolves the `ipa` strings of all the others.
        let (ipa, rest): (Vec<_>, Vec<_>) = configs
            .into_iter()
            .partition(|enc| enc.id.eq_ignore_ascii_case(IPA_ENCODING));

        let mut ipa_encoder = None;
        for enc in ipa {
            if ipa_encoder.is_some() {
                self.record(
                    OWNER,
                    ConfigIssue::Load(format!("duplicate encoding id '{}'", enc.id)),
                );
                continue;
            }
            ipa_encoder = self.build_encoding(&enc, None);
        }

        for enc in rest {
            if self.encoder(&enc.id).is_some() {
                self.record(
                    OWNER,
                    ConfigIssue::Load(format!("duplicate encoding id '{}'", enc.id)),
                );
                continue;
            }
            self.build_encoding(&enc, ipa_encoder.as_deref());
        }
    }

    fn build_encoding(
        &mut self,
        config: &EncodingConfig,
        ipa: Option<&Encoder>,
    ) -> Option<Arc<Encoder>> {
        let Some(features) = self.feature_set(&config.features).cloned() else {
            self.record(
                &format!("encoding '{}'", config.id),
                ConfigIssue::UnknownReference {
                    kind: "feature set",
                    id: config.features.clone(),
                },
            );
            return None;
        };

        tracing::debug!(id = %config.id, patterns = config.patterns.len(), "building encoding");
        let encoding = Encoding::from_config(config, features, ipa);
        let encoder = Arc::new(Encoder::new(Arc::new(encoding)));
        self.encoders.push(Arc::clone(&encoder));
        Some(encoder)
    }

    fn build_lexicons(&mut self, config: &Config) {
        for lex in &config.lexicons {
            let owner = format!("lexicon '{}'", lex.id);

            let kind = match lex.kind.parse::<LexiconKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    self.record(
                        &owner,
                        ConfigIssue::UnknownReference {
                            kind: "lexicon kind",
                            id: lex.kind.clone(),
                        },
                    );
                    continue;
                }
            };
            let Some(encoder) = self.encoder(&lex.encoding) else {
                self.record(
                    &owner,
                    ConfigIssue::UnknownReference {
                        kind: "encoding",
                        id: lex.encoding.clone(),
                    },
                );
                continue;
            };

            let source = LexiconFactory::create(kind, self.base_dir.join(&lex.path), lex.limit);
            self.lexicons
                .push(Arc::new(Lexicon::new(lex.id.clone(), encoder, source)));
        }
    }

    fn build_hypotheses(&mut self, config: &Config) {
        for hyp in &config.hypotheses {
            let encoder = match &hyp.encoding {
                Some(id) => {
                    let encoder = self.encoder(id);
                    if encoder.is_none() {
                        self.record(
                            &format!("hypotheses '{}'", hyp.id),
                            ConfigIssue::UnknownReference {
                                kind: "encoding",
                                id: id.clone(),
                            },
                        );
                    }
                    encoder
                }
                None => None,
            };
            self.hypotheses
                .push(Arc::new(HypothesisTable::from_config(hyp, encoder.as_deref())));
        }
    }

    fn check_matcher(&mut self) {
        let Some(matcher) = self.matcher.clone() else {
            return;
        };
        let owner = "matcher";

        for id in &matcher.lexicons {
            if self.lexicon(id).is_none() {
                self.record(
                    owner,
                    ConfigIssue::UnknownReference {
                        kind: "lexicon",
                        id: id.clone(),
                    },
                );
            }
        }
        if let Some(id) = &matcher.hypotheses {
            if self.hypothesis_table(id).is_none() {
                self.record(
                    owner,
                    ConfigIssue::UnknownReference {
                        kind: "hypotheses",
                        id: id.clone(),
                    },
                );
            }
        }
        if let Some(feature) = &matcher.consonantal {
            let known = self
                .input_encoder()
                .is_some_and(|enc| enc.features().dimension_index(feature).is_some());
            if !known {
                self.record(
                    owner,
                    ConfigIssue::UnknownReference {
                        kind: "feature",
                        id: feature.clone(),
                    },
                );
            }
        }
    }

    fn check_input(&mut self) {
        let Some(input) = self.input.clone() else {
            return;
        };
        if self.encoder(&input.encoding).is_none() {
            self.record(
                "input",
                ConfigIssue::UnknownReference {
                    kind: "encoding",
                    id: input.encoding,
                },
            );
        }
    }

    /// Directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Feature sets in configuration order.
    pub fn feature_sets(&self) -> &[Arc<FeatureSet>] {
        &self.feature_sets
    }

    /// Feature set with the given id.
    pub fn feature_set(&self, id: &str) -> Option<&Arc<FeatureSet>> {
        self.feature_sets.iter().find(|fs| fs.name() == id)
    }

    /// Encoders, IPA first, then in configuration order.
    pub fn encoders(&self) -> &[Arc<Encoder>] {
        &self.encoders
    }

    /// Encoder for the encoding with the given id; `ipa` matches in any case.
    pub fn encoder(&self, id: &str) -> Option<Arc<Encoder>> {
        self.encoders
            .iter()
            .find(|enc| {
                let encoding = enc.encoding();
                encoding.name() == id
                    || (encoding.is_ipa() && id.eq_ignore_ascii_case(IPA_ENCODING))
            })
            .cloned()
    }

    /// Lexicons in configuration order.
    pub fn lexicons(&self) -> &[Arc<Lexicon>] {
        &self.lexicons
    }

    /// Lexicon with the given id.
    pub fn lexicon(&self, id: &str) -> Option<&Arc<Lexicon>> {
        self.lexicons.iter().find(|lex| lex.name() == id)
    }

    /// Hypothesis tables in configuration order.
    pub fn hypotheses(&self) -> &[Arc<HypothesisTable>] {
        &self.hypotheses
    }

    /// Hypothesis table with the given id.
    pub fn hypothesis_table(&self, id: &str) -> Option<&Arc<HypothesisTable>> {
        self.hypotheses.iter().find(|table| table.name() == id)
    }

    /// Encoder applied to query tokens.
    pub fn input_encoder(&self) -> Option<Arc<Encoder>> {
        self.input.as_ref().and_then(|input| self.encoder(&input.encoding))
    }

    /// Token delimiters for query text.
    pub fn delimiters(&self) -> &str {
        self.input
            .as_ref()
            .and_then(|input| input.delimiters.as_deref())
            .unwrap_or(DEFAULT_DELIMITERS)
    }

    /// A fresh matcher with the configured settings.
    ///
    /// Unknown references were recorded during assembly and are skipped here.
    pub fn matcher(&self) -> Option<Matcher> {
        let config = self.matcher.as_ref()?;

        let lexicons = config
            .lexicons
            .iter()
            .filter_map(|id| self.lexicon(id).cloned())
            .collect();
        let mut matcher = Matcher::new(lexicons)
            .with_option_count(config.option_count())
            .with_tolerance(config.tolerance());

        if let Some(table) = config.hypotheses.as_deref().and_then(|id| self.hypothesis_table(id)) {
            matcher = matcher.with_hypotheses(Arc::clone(table));
        }

        let expansion = config.consonantal.as_deref().and_then(|feature| {
            let encoder = self.input_encoder()?;
            ConsonantExpansion::new(encoder.features(), feature, config.consonant_copies())
        });
        if let Some(expansion) = expansion {
            matcher = matcher.with_expansion(expansion);
        }

        Some(matcher)
    }

    /// Problems recorded while assembling.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Every recorded problem, including those of feature sets, encodings
    /// and lexicons. Loads every lexicon.
    pub fn all_errors(&self) -> Vec<ErrorRecord> {
        let mut all = self.errors.clone();
        for fs in &self.feature_sets {
            all.extend_from_slice(fs.errors());
        }
        for enc in &self.encoders {
            all.extend_from_slice(enc.encoding().errors());
        }
        for lex in &self.lexicons {
            all.extend_from_slice(lex.errors());
        }
        all
    }
}
