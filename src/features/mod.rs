//! Phonological feature sets and ternary feature vectors.
//!
//! A [`FeatureSet`] names the dimensions of every phone vector used by the
//! encodings, lexicons and matcher that share it. Dimension order is fixed
//! once, when the set is built, by sorting the configured alias groups; from
//! then on a [`FeatureVector`] is addressed purely by position.
//!
//! Each dimension holds one of three values:
//!
//! - `plus_value` for a `+Name` specification
//! - `minus_value` for a `-Name` specification
//! - `unset_value` (the midpoint unless overridden) when nothing was said
//!
//! # Example
//!
//! ```rust
//! use phonmatch::features::FeatureSet;
//!
//! let features = FeatureSet::from_names(["Voice", "Cons"], 1.0, -1.0);
//!
//! let mut errors = Vec::new();
//! let vector = features.feature_vector(["+Cons", "-Voice"], &mut errors);
//! assert!(errors.is_empty());
//! assert_eq!(vector, vec![1.0, -1.0]);
//! assert_eq!(features.feature_spec(&vector), vec!["+Cons", "-Voice"]);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::distance::euclidean_distance;
use crate::error::{self, ConfigIssue, ErrorRecord};

/// A single phone: one number per [`FeatureSet`] dimension.
pub type FeatureVector = Vec<f64>;

/// Default value for a `+Name` specification.
pub const DEFAULT_PLUS_VALUE: f64 = 1.0;

/// Default value for a `-Name` specification.
pub const DEFAULT_MINUS_VALUE: f64 = -1.0;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"^\w+$").expect("valid word pattern"))
}

fn spec_regex() -> &'static Regex {
    static SPEC: OnceLock<Regex> = OnceLock::new();
    SPEC.get_or_init(|| Regex::new(r"^([+-])(\w+)$").expect("valid feature spec pattern"))
}

/// Named, ordered phonological feature dimensions.
///
/// Immutable once built; share it behind an `Arc` between every encoding and
/// lexicon that uses it.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    name: String,
    groups: Vec<String>,
    display_names: Vec<String>,
    indices: FxHashMap<String, usize>,
    plus_value: f64,
    minus_value: f64,
    unset_value: f64,
    errors: Vec<ErrorRecord>,
}

impl FeatureSet {
    /// Build a feature set from comma-joined alias groups.
    ///
    /// Groups are sorted lexicographically to fix the canonical dimension
    /// order. Lookup by alias is case-insensitive. Malformed or duplicate
    /// aliases are recorded in [`errors`](Self::errors) and skipped.
    pub fn from_names<I, S>(groups: I, plus_value: f64, minus_value: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build("features", groups, plus_value, minus_value, None)
    }

    /// Build a named feature set, optionally overriding the unset value.
    ///
    /// The `name` identifies the set in recorded errors.
    pub fn build<I, S>(
        name: &str,
        groups: I,
        plus_value: f64,
        minus_value: f64,
        unset_value: Option<f64>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owner = format!("feature set '{}'", name);
        let mut errors = Vec::new();

        let mut groups: Vec<String> = groups
            .into_iter()
            .map(|g| g.as_ref().trim().to_string())
            .collect();
        groups.sort();

        if groups.is_empty() {
            error::record(&mut errors, &owner, ConfigIssue::NoFeatures);
        }

        let mut indices = FxHashMap::default();
        let mut display_names = Vec::with_capacity(groups.len());

        for (index, group) in groups.iter().enumerate() {
            let aliases: Vec<&str> = group
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();

            display_names.push(aliases.last().copied().unwrap_or(group.as_str()).to_string());

            for alias in aliases {
                if !word_regex().is_match(alias) {
                    error::record(
                        &mut errors,
                        &owner,
                        ConfigIssue::InvalidFeatureName(alias.to_string()),
                    );
                    continue;
                }

                let key = alias.to_uppercase();
                if indices.contains_key(&key) {
                    error::record(
                        &mut errors,
                        &owner,
                        ConfigIssue::DuplicateFeatureName(alias.to_string()),
                    );
                } else {
                    indices.insert(key, index);
                }
            }
        }

        Self {
            name: name.to_string(),
            groups,
            display_names,
            indices,
            plus_value,
            minus_value,
            unset_value: unset_value.unwrap_or((plus_value + minus_value) / 2.0),
            errors,
        }
    }

    /// Identifier of this feature set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of dimensions; the length of every vector built from this set.
    #[inline]
    pub fn num_dimensions(&self) -> usize {
        self.groups.len()
    }

    /// Value of a `+Name` dimension.
    #[inline]
    pub fn plus_value(&self) -> f64 {
        self.plus_value
    }

    /// Value of a `-Name` dimension.
    #[inline]
    pub fn minus_value(&self) -> f64 {
        self.minus_value
    }

    /// Value of a dimension nothing was said about.
    #[inline]
    pub fn unset_value(&self) -> f64 {
        self.unset_value
    }

    /// Alias groups in canonical (dimension) order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Display name of each dimension (the last alias of its group).
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.display_names.iter().map(String::as_str)
    }

    /// Position of the dimension with the given alias, ignoring case.
    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.indices.get(&name.trim().to_uppercase()).copied()
    }

    /// Problems recorded while building this set.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// A vector with every dimension unset.
    pub fn unset_vector(&self) -> FeatureVector {
        vec![self.unset_value; self.num_dimensions()]
    }

    /// Build a vector from `+Name` / `-Name` specifications.
    ///
    /// Every position starts unset. A spec that is malformed or names an
    /// unknown dimension is appended to `errors` and leaves its position
    /// unset. Blank specs are ignored.
    pub fn feature_vector<I, S>(&self, specs: I, errors: &mut Vec<ConfigIssue>) -> FeatureVector
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vector = self.unset_vector();

        if self.indices.is_empty() {
            errors.push(ConfigIssue::NoFeatures);
            return vector;
        }

        for spec in specs {
            let spec = spec.as_ref().trim();
            if spec.is_empty() {
                continue;
            }

            let Some(caps) = spec_regex().captures(spec) else {
                errors.push(ConfigIssue::InvalidFeatureSpec(spec.to_string()));
                continue;
            };

            let name = &caps[2];
            match self.indices.get(&name.to_uppercase()) {
                Some(&index) => {
                    vector[index] = if &caps[1] == "+" {
                        self.plus_value
                    } else {
                        self.minus_value
                    };
                }
                None => errors.push(ConfigIssue::UnknownFeatureName(name.to_string())),
            }
        }

        vector
    }

    /// Signed names of every dimension set exactly to plus or minus.
    ///
    /// Dimensions holding any other value, including the unset value, are
    /// omitted.
    pub fn feature_spec(&self, vector: &[f64]) -> Vec<String> {
        vector
            .iter()
            .zip(&self.display_names)
            .filter_map(|(&value, name)| {
                if value == self.plus_value {
                    Some(format!("+{}", name))
                } else if value == self.minus_value {
                    Some(format!("-{}", name))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Overlay `overlay` onto `original`.
    ///
    /// Each position takes the overlay value unless it equals the unset value,
    /// in which case the original value is kept. A position deliberately set
    /// to the neutral value is indistinguishable from one never mentioned.
    pub fn override_vector(&self, original: &[f64], overlay: &[f64]) -> FeatureVector {
        original
            .iter()
            .enumerate()
            .map(|(i, &orig)| match overlay.get(i) {
                Some(&value) if value != self.unset_value => value,
                _ => orig,
            })
            .collect()
    }

    /// Euclidean distance between two phones of this set.
    #[inline]
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        euclidean_distance(a, b)
    }
}
