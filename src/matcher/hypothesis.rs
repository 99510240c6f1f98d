//! Curated readings looked up by exact token.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::HypothesisConfig;
use crate::lexicon::LexiconEntry;
use crate::transducer::Encoder;

/// One curated reading of a raw token.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    /// Name of the group the reading belongs to
    pub group: Option<String>,
    /// The proposed reading; phones are empty unless the table has an encoding
    pub entry: Arc<LexiconEntry>,
}

/// Exact-match table from raw tokens to curated readings.
///
/// Lookups bypass phonetic ranking entirely: a token either is in the table
/// or is not.
#[derive(Debug, Clone, Default)]
pub struct HypothesisTable {
    name: String,
    by_input: FxHashMap<String, Vec<Hypothesis>>,
    len: usize,
}

impl HypothesisTable {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a table from its configuration record.
    ///
    /// With an `encoder`, each lemma is transduced so the reading can also be
    /// given a phonetic distance.
    pub fn from_config(config: &HypothesisConfig, encoder: Option<&Encoder>) -> Self {
        let mut table = Self::new(config.id.clone());

        for group in &config.groups {
            for item in &group.entries {
                let phones = encoder
                    .map(|encoder| encoder.encode(&item.lemma))
                    .unwrap_or_default();
                let mut entry = LexiconEntry::new(item.lemma.clone(), phones);
                if let Some(definition) = &item.definition {
                    entry = entry.with_definition(definition.as_str());
                }
                let entry = Arc::new(entry);

                for input in item.input.iter() {
                    table.insert(input, group.name.clone(), Arc::clone(&entry));
                }
            }
        }

        tracing::debug!(table = %table.name, hypotheses = table.len, "built hypothesis table");
        table
    }

    /// Add a reading for `input`.
    pub fn insert(&mut self, input: &str, group: Option<String>, entry: Arc<LexiconEntry>) {
        self.by_input
            .entry(input.to_string())
            .or_default()
            .push(Hypothesis { group, entry });
        self.len += 1;
    }

    /// Identifier of this table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Readings of `token`, in configuration order.
    pub fn lookup(&self, token: &str) -> &[Hypothesis] {
        self.by_input.get(token).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of (input, reading) pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the table holds no readings.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
