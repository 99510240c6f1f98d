//! Approximate phonetic matching against lexicons.
//!
//! For each query token the [`Matcher`] computes the banded DTW distance
//! between the token's phones and every entry of every configured lexicon,
//! and keeps the best N. Curated readings from a [`HypothesisTable`] are
//! emitted alongside when the raw token matches exactly.
//!
//! Results are memoised by raw token for the lifetime of the matcher, so a
//! matcher should span a single processing pass.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use phonmatch::features::FeatureSet;
//! use phonmatch::lexicon::{Lexicon, LexiconEntry};
//! use phonmatch::matcher::Matcher;
//! use phonmatch::transducer::{Encoder, Encoding};
//!
//! let features = Arc::new(FeatureSet::from_names(["cons"], 1.0, -1.0));
//! let encoder = Arc::new(Encoder::new(Arc::new(Encoding::new("none", features, vec![]))));
//! let lexicon = Lexicon::from_entries("words", encoder, vec![
//!     LexiconEntry::new("A", vec![vec![0.1]]),
//!     LexiconEntry::new("B", vec![vec![0.3]]),
//!     LexiconEntry::new("C", vec![vec![0.2]]),
//! ]);
//!
//! let mut matcher = Matcher::new(vec![Arc::new(lexicon)]).with_option_count(2);
//! let lemmas: Vec<_> = matcher
//!     .match_token("x", &[vec![0.0]])
//!     .iter()
//!     .map(|option| option.text().to_string())
//!     .collect();
//! assert_eq!(lemmas, ["A", "C"]);
//! ```

pub mod hypothesis;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::{DEFAULT_OPTION_COUNT, MAX_CONSONANT_COPIES, MAX_OPTION_COUNT};
use crate::distance::{euclidean_distance, sequence_distance};
use crate::features::{FeatureSet, FeatureVector};
use crate::lexicon::{Lexicon, LexiconEntry};

pub use hypothesis::{Hypothesis, HypothesisTable};

/// Where a [`MatchOption`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    /// Ranked by distance from the named lexicon
    Lexicon(String),
    /// Exact lookup in the named hypothesis table
    Hypothesis(String),
}

/// One candidate reading of a query token.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOption {
    /// Origin of the candidate
    pub kind: MatchKind,
    /// The matched entry
    pub entry: Arc<LexiconEntry>,
    /// DTW distance from the query, when both sides have phones
    pub distance: Option<f64>,
}

impl MatchOption {
    /// Display text: the entry's lemma.
    pub fn text(&self) -> &str {
        &self.entry.lemma
    }

    /// Phones of the matched entry.
    pub fn phones(&self) -> &[FeatureVector] {
        &self.entry.phones
    }

    /// True for curated readings.
    pub fn is_hypothesis(&self) -> bool {
        matches!(self.kind, MatchKind::Hypothesis(_))
    }
}

/// Repeats consonantal phones of a query before comparison.
///
/// A phone is consonantal when its value on the configured dimension equals
/// the feature set's plus value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsonantExpansion {
    dimension: usize,
    plus_value: f64,
    copies: usize,
}

impl ConsonantExpansion {
    /// Expansion keyed on the dimension named `feature`.
    ///
    /// Returns `None` if `features` has no such dimension. `copies` is
    /// clamped to at most two.
    pub fn new(features: &FeatureSet, feature: &str, copies: usize) -> Option<Self> {
        Some(Self {
            dimension: features.dimension_index(feature)?,
            plus_value: features.plus_value(),
            copies: copies.min(MAX_CONSONANT_COPIES),
        })
    }

    /// Extra copies added after each consonantal phone.
    pub fn copies(&self) -> usize {
        self.copies
    }

    /// True if `phone` is consonantal.
    pub fn is_consonantal(&self, phone: &[f64]) -> bool {
        phone.get(self.dimension) == Some(&self.plus_value)
    }

    /// `phones` with every consonantal phone repeated.
    pub fn expand(&self, phones: &[FeatureVector]) -> Vec<FeatureVector> {
        let mut expanded = Vec::with_capacity(phones.len() * (1 + self.copies));
        for phone in phones {
            expanded.push(phone.clone());
            if self.is_consonantal(phone) {
                for _ in 0..self.copies {
                    expanded.push(phone.clone());
                }
            }
        }
        expanded
    }
}

/// Ranks lexicon entries against query phones.
#[derive(Debug)]
pub struct Matcher {
    lexicons: Vec<Arc<Lexicon>>,
    hypotheses: Option<Arc<HypothesisTable>>,
    option_count: usize,
    tolerance: f64,
    expansion: Option<ConsonantExpansion>,
    cache: FxHashMap<String, Vec<MatchOption>>,
}

impl Matcher {
    /// Create a matcher over `lexicons`, searched in order.
    pub fn new(lexicons: Vec<Arc<Lexicon>>) -> Self {
        Self {
            lexicons,
            hypotheses: None,
            option_count: DEFAULT_OPTION_COUNT,
            tolerance: 0.0,
            expansion: None,
            cache: FxHashMap::default(),
        }
    }

    /// Number of ranked options per token, clamped to `1..=20`.
    pub fn with_option_count(mut self, count: usize) -> Self {
        self.option_count = count.clamp(1, MAX_OPTION_COUNT);
        self
    }

    /// DTW band tolerance, clamped to `[0, 1]`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = if tolerance.is_nan() {
            0.0
        } else {
            tolerance.clamp(0.0, 1.0)
        };
        self
    }

    /// Also emit readings from `table`.
    pub fn with_hypotheses(mut self, table: Arc<HypothesisTable>) -> Self {
        self.hypotheses = Some(table);
        self
    }

    /// Expand consonantal query phones before comparison.
    pub fn with_expansion(mut self, expansion: ConsonantExpansion) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Options per token.
    pub fn option_count(&self) -> usize {
        self.option_count
    }

    /// Band tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Lexicons, in search order.
    pub fn lexicons(&self) -> &[Arc<Lexicon>] {
        &self.lexicons
    }

    /// Number of memoised tokens.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget memoised results.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Candidates for `token`, whose transduced phones are `phones`.
    ///
    /// Hypotheses come first, then up to N lexicon entries by ascending
    /// distance. The result for a given `token` is computed once and reused
    /// for every later call with the same token.
    pub fn match_token(&mut self, token: &str, phones: &[FeatureVector]) -> &[MatchOption] {
        if !self.cache.contains_key(token) {
            let options = self.rank(token, phones);
            tracing::debug!(token, options = options.len(), "matched token");
            self.cache.insert(token.to_string(), options);
        }
        self.cache.get(token).map(Vec::as_slice).unwrap_or_default()
    }

    /// Candidates for `token` without memoisation.
    pub fn rank(&self, token: &str, phones: &[FeatureVector]) -> Vec<MatchOption> {
        let query = match &self.expansion {
            Some(expansion) => expansion.expand(phones),
            None => phones.to_vec(),
        };

        let mut options = self.hypothesis_options(token, &query);
        options.extend(self.best_entries(&query));
        options
    }

    fn distance(&self, query: &[FeatureVector], phones: &[FeatureVector]) -> f64 {
        sequence_distance(
            query,
            phones,
            |a, b| euclidean_distance(a, b),
            self.tolerance,
        )
    }

    fn hypothesis_options(&self, token: &str, query: &[FeatureVector]) -> Vec<MatchOption> {
        let Some(table) = &self.hypotheses else {
            return Vec::new();
        };

        table
            .lookup(token)
            .iter()
            .map(|hypothesis| MatchOption {
                kind: MatchKind::Hypothesis(table.name().to_string()),
                entry: Arc::clone(&hypothesis.entry),
                distance: (!query.is_empty() && !hypothesis.entry.phones.is_empty())
                    .then(|| self.distance(query, &hypothesis.entry.phones)),
            })
            .collect()
    }

    /// Bounded best-N selection in lexicon iteration order.
    fn best_entries(&self, query: &[FeatureVector]) -> Vec<MatchOption> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut best: Vec<(f64, usize, &Arc<LexiconEntry>)> =
            Vec::with_capacity(self.option_count + 1);
        let mut worst = f64::MAX;

        for (index, lexicon) in self.lexicons.iter().enumerate() {
            for entry in lexicon.entries() {
                if entry.phones.is_empty() {
                    continue;
                }

                let distance = self.distance(query, &entry.phones);
                if distance < worst || best.len() < self.option_count {
                    best.push((distance, index, entry));
                    best.sort_by(|a, b| a.0.total_cmp(&b.0));
                    best.truncate(self.option_count);
                    worst = best.last().map_or(f64::MAX, |b| b.0);
                }
            }
        }

        best.into_iter()
            .map(|(distance, index, entry)| MatchOption {
                kind: MatchKind::Lexicon(self.lexicons[index].name().to_string()),
                entry: Arc::clone(entry),
                distance: Some(distance),
            })
            .collect()
    }
}
