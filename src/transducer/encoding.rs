//! Encodings: ordered pattern tables.

use std::sync::Arc;

use crate::config::EncodingConfig;
use crate::error::{self, ErrorRecord};
use crate::features::FeatureSet;

use super::encoder::Encoder;
use super::pattern::EncodingPattern;

/// Identifier of the encoding used to resolve IPA strings.
pub const IPA_ENCODING: &str = "ipa";

/// An ordered table of [`EncodingPattern`]s over one [`FeatureSet`].
///
/// Patterns are kept sorted by descending input length (stable, so equal
/// lengths keep their configured order). This fixes longest-match precedence
/// for every encoder built on the encoding.
#[derive(Debug, Clone)]
pub struct Encoding {
    name: String,
    description: Option<String>,
    features: Arc<FeatureSet>,
    patterns: Vec<EncodingPattern>,
    errors: Vec<ErrorRecord>,
}

impl Encoding {
    /// Create an encoding from already-built patterns.
    pub fn new(
        name: impl Into<String>,
        features: Arc<FeatureSet>,
        mut patterns: Vec<EncodingPattern>,
    ) -> Self {
        patterns.sort_by_key(|p| std::cmp::Reverse(p.input_len()));
        Self {
            name: name.into(),
            description: None,
            features,
            patterns,
            errors: Vec::new(),
        }
    }

    /// Build an encoding from its configuration record.
    ///
    /// `ipa` is an encoder over the `ipa` encoding, used by patterns that give
    /// an IPA string instead of literal feature specs. Pattern problems are
    /// recorded in [`errors`](Self::errors).
    pub fn from_config(
        config: &EncodingConfig,
        features: Arc<FeatureSet>,
        ipa: Option<&Encoder>,
    ) -> Self {
        let owner = format!("encoding '{}'", config.id);
        let mut errors = Vec::new();

        let patterns = config
            .patterns
            .iter()
            .map(|pattern| {
                let mut issues = Vec::new();
                let built = EncodingPattern::from_config(pattern, &features, ipa, &mut issues);
                for issue in issues {
                    error::record(&mut errors, &owner, issue);
                }
                built
            })
            .collect();

        let mut encoding = Self::new(config.id.clone(), features, patterns);
        encoding.description = config.description.clone();
        encoding.errors = errors;
        encoding
    }

    /// Identifier of this encoding.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// True for the encoding that resolves IPA strings.
    pub fn is_ipa(&self) -> bool {
        self.name.eq_ignore_ascii_case(IPA_ENCODING)
    }

    /// Feature set the phones are built from.
    pub fn features(&self) -> &Arc<FeatureSet> {
        &self.features
    }

    /// Patterns, longest input first.
    pub fn patterns(&self) -> &[EncodingPattern] {
        &self.patterns
    }

    /// Problems recorded while building this encoding.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }
}
