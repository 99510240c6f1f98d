//! Encoding patterns.

use crate::config::PatternConfig;
use crate::error::ConfigIssue;
use crate::features::{FeatureSet, FeatureVector};

use super::automaton::{PatternAutomaton, WILDCARD};
use super::encoder::Encoder;

/// One orthography-to-phonology rule.
///
/// A pattern whose input has exactly one [`WILDCARD`] is a *template*: it
/// overlays its phones onto the phone already assigned at the wildcard
/// position. Any other pattern is a *replacement*: it replaces the literal
/// span it matches with its output text and phones.
///
/// A pattern whose configuration is defective (empty input, no phones) is
/// *inert* and matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingPattern {
    input: String,
    output: Option<String>,
    repr: Option<String>,
    phones: Vec<FeatureVector>,
    wildcard: Option<usize>,
    inert: bool,
}

impl EncodingPattern {
    /// Create a pattern with literal phones.
    pub fn new(input: impl Into<String>, phones: Vec<FeatureVector>) -> Self {
        let input = input.into();
        let wildcard = wildcard_offset(&input);
        let inert = input.is_empty() || phones.is_empty();
        Self {
            input,
            output: None,
            repr: None,
            phones,
            wildcard,
            inert,
        }
    }

    /// Set the replacement text.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into()).filter(|o: &String| !o.is_empty());
        self
    }

    /// Set the secondary transliteration.
    pub fn with_repr(mut self, repr: impl Into<String>) -> Self {
        self.repr = Some(repr.into()).filter(|r: &String| !r.is_empty());
        self
    }

    /// Build a pattern from its configuration record.
    ///
    /// Literal feature specs are resolved against `features`; an IPA string is
    /// encoded with `ipa`. Problems are appended to `issues` and leave the
    /// pattern inert.
    pub fn from_config(
        config: &PatternConfig,
        features: &FeatureSet,
        ipa: Option<&Encoder>,
        issues: &mut Vec<ConfigIssue>,
    ) -> Self {
        let input = config.input.as_str();
        if input.is_empty() {
            issues.push(ConfigIssue::EmptyInput);
        }

        if input.chars().filter(|&c| c == WILDCARD).count() > 1 {
            issues.push(ConfigIssue::MultipleWildcards(input.to_string()));
        }

        let phones = match (&config.features, &config.ipa) {
            (Some(_), Some(_)) => {
                issues.push(ConfigIssue::AmbiguousPhones(input.to_string()));
                Vec::new()
            }
            (Some(spec), None) => {
                let mut errors = Vec::new();
                let phones: Vec<FeatureVector> = spec
                    .phones()
                    .into_iter()
                    .map(|specs| features.feature_vector(specs, &mut errors))
                    .collect();
                issues.extend(errors.into_iter().map(|issue| ConfigIssue::PatternFeature {
                    input: input.to_string(),
                    issue: Box::new(issue),
                }));
                phones
            }
            (None, Some(ipa_text)) => ipa_phones(input, ipa_text, features, ipa, issues),
            (None, None) => {
                issues.push(ConfigIssue::MissingPhones(input.to_string()));
                Vec::new()
            }
        };

        let mut pattern = Self::new(input, phones);
        if let Some(output) = &config.output {
            pattern = pattern.with_output(output.as_str());
        }
        if let Some(repr) = &config.repr {
            pattern = pattern.with_repr(repr.as_str());
        }
        pattern
    }

    /// Input template.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replacement text, if any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Secondary transliteration, if any.
    pub fn repr(&self) -> Option<&str> {
        self.repr.as_deref()
    }

    /// Phones contributed by this pattern.
    pub fn phones(&self) -> &[FeatureVector] {
        &self.phones
    }

    /// Number of characters in the input template.
    pub fn input_len(&self) -> usize {
        self.input.chars().count()
    }

    /// True if this pattern has no single wildcard.
    pub fn is_replacement(&self) -> bool {
        self.wildcard.is_none()
    }

    /// Wildcard position of a template pattern.
    pub fn wildcard_offset(&self) -> Option<usize> {
        self.wildcard
    }

    /// True if this pattern matches nothing.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Compile the input template.
    pub fn compile(&self) -> PatternAutomaton {
        if self.inert {
            return PatternAutomaton::inert();
        }
        match self.wildcard {
            Some(offset) => PatternAutomaton::template(&self.input, offset)
                .unwrap_or_else(PatternAutomaton::inert),
            None => PatternAutomaton::literal(&self.input),
        }
    }
}

/// Offset of the wildcard when the template has exactly one.
fn wildcard_offset(input: &str) -> Option<usize> {
    let mut positions = input
        .chars()
        .enumerate()
        .filter(|&(_, c)| c == WILDCARD)
        .map(|(i, _)| i);

    match (positions.next(), positions.next()) {
        (Some(offset), None) => Some(offset),
        _ => None,
    }
}

fn ipa_phones(
    input: &str,
    ipa_text: &str,
    features: &FeatureSet,
    ipa: Option<&Encoder>,
    issues: &mut Vec<ConfigIssue>,
) -> Vec<FeatureVector> {
    let Some(encoder) = ipa else {
        issues.push(ConfigIssue::NoIpaEncoding(input.to_string()));
        return Vec::new();
    };

    let ipa_features = encoder.features();
    if ipa_features.num_dimensions() != features.num_dimensions() {
        issues.push(ConfigIssue::FeatureSetMismatch {
            features: features.name().to_string(),
            expected: features.num_dimensions(),
            ipa: ipa_features.num_dimensions(),
        });
        return Vec::new();
    }

    let phones = encoder.encode(ipa_text);
    if phones.is_empty() {
        issues.push(ConfigIssue::EmptyIpa {
            input: input.to_string(),
            ipa: ipa_text.to_string(),
        });
    }
    phones
}
