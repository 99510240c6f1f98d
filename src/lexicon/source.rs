//! Lexicon sources.
//!
//! A source reads its records and turns each into a [`LexiconEntry`] by
//! transducing the record's spelling with the lexicon's [`Encoder`]. Problems
//! with individual records are appended to `issues`; only a failure that
//! leaves nothing to read is returned as an error.

use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{ConfigIssue, Error, Result};
use crate::transducer::Encoder;

use super::LexiconEntry;

/// Something a [`Lexicon`](super::Lexicon) can be loaded from.
pub trait LexiconSource: Send + Sync {
    /// Short human-readable description, used in log messages.
    fn describe(&self) -> String;

    /// Read every entry, in source order.
    fn load(&self, encoder: &Encoder, issues: &mut Vec<ConfigIssue>) -> Result<Vec<LexiconEntry>>;
}

/// Entries already built in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<LexiconEntry>,
}

impl MemorySource {
    /// Wrap `entries`.
    pub fn new(entries: Vec<LexiconEntry>) -> Self {
        Self { entries }
    }
}

impl LexiconSource for MemorySource {
    fn describe(&self) -> String {
        format!("{} in-memory entries", self.entries.len())
    }

    fn load(&self, _encoder: &Encoder, _issues: &mut Vec<ConfigIssue>) -> Result<Vec<LexiconEntry>> {
        Ok(self.entries.clone())
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The CMU pronouncing dictionary.
///
/// Each line is a word followed by its ARPAbet phone tokens:
///
/// ```text
/// ;;; comment
/// HELLO  HH AH0 L OW1
/// HELLO(2)  HH EH0 L OW1
/// ```
///
/// The word is upper-cased and becomes the lemma; variant markers such as
/// `(2)` stay part of it. Each phone token is transduced on its own and the
/// phones are concatenated, so the encoding should map ARPAbet symbols.
#[derive(Debug, Clone)]
pub struct CmuDictSource {
    path: PathBuf,
    limit: Option<usize>,
}

impl CmuDictSource {
    /// Read at most `limit` lines of `path`.
    pub fn new(path: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    /// Parse dictionary text.
    pub fn parse(
        text: &str,
        limit: Option<usize>,
        encoder: &Encoder,
        issues: &mut Vec<ConfigIssue>,
    ) -> Vec<LexiconEntry> {
        let mut entries = Vec::new();

        for (index, line) in text.lines().take(limit.unwrap_or(usize::MAX)).enumerate() {
            if line.starts_with(";;;") || line.trim().is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(word) = tokens.next() else {
                continue;
            };
            let symbols: Vec<&str> = tokens.collect();
            if symbols.is_empty() {
                issues.push(ConfigIssue::MalformedLine {
                    line: index + 1,
                    message: format!("no pronunciation for '{word}'"),
                });
                continue;
            }

            let phones = symbols
                .iter()
                .flat_map(|symbol| encoder.encode(symbol))
                .collect();
            entries.push(LexiconEntry::new(word.to_uppercase(), phones).with_text(symbols.join(" ")));
        }

        entries
    }
}

impl LexiconSource for CmuDictSource {
    fn describe(&self) -> String {
        format!("CMU dictionary {}", self.path.display())
    }

    fn load(&self, encoder: &Encoder, issues: &mut Vec<ConfigIssue>) -> Result<Vec<LexiconEntry>> {
        let text = read_text(&self.path)?;
        Ok(Self::parse(&text, self.limit, encoder, issues))
    }
}

/// A plain word list: one `lemma<TAB>definition` per line.
///
/// The definition is optional. The lemma is transduced as spelled.
#[derive(Debug, Clone)]
pub struct WordListSource {
    path: PathBuf,
    limit: Option<usize>,
}

impl WordListSource {
    /// Read at most `limit` lines of `path`.
    pub fn new(path: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    /// Parse word-list text.
    pub fn parse(text: &str, limit: Option<usize>, encoder: &Encoder) -> Vec<LexiconEntry> {
        text.lines()
            .take(limit.unwrap_or(usize::MAX))
            .filter_map(|line| {
                let (lemma, definition) = match line.split_once('\t') {
                    Some((lemma, definition)) => (lemma.trim(), definition.trim()),
                    None => (line.trim(), ""),
                };
                if lemma.is_empty() {
                    return None;
                }
                Some(LexiconEntry::encoded(lemma, lemma, encoder).with_definition(definition))
            })
            .collect()
    }
}

impl LexiconSource for WordListSource {
    fn describe(&self) -> String {
        format!("word list {}", self.path.display())
    }

    fn load(&self, encoder: &Encoder, _issues: &mut Vec<ConfigIssue>) -> Result<Vec<LexiconEntry>> {
        let text = read_text(&self.path)?;
        Ok(Self::parse(&text, self.limit, encoder))
    }
}

/// A bilingual dictionary export in JSON.
///
/// ```json
/// {
///   "languages": [{ "code": "rmn", "name": "Romani" }],
///   "entries": [
///     { "lemma": "pani", "partOfSpeech": "n", "definition": "water", "srcLangCode": "rmn" }
///   ]
/// }
/// ```
///
/// Records are grouped by lemma, in order of first appearance. The display
/// text is the first entry form that differs from the lemma, and the
/// definition has one `pos: form (language)` line per record, where the
/// form is the record's entry or else its lemma. Glosses are not read.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument {
    #[serde(default)]
    languages: Vec<ExportLanguage>,
    #[serde(default)]
    entries: Vec<ExportRecord>,
}

#[derive(Debug, Deserialize)]
struct ExportLanguage {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRecord {
    lemma: String,
    #[serde(default)]
    entry: Option<String>,
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    src_lang_code: Option<String>,
}

impl ExportRecord {
    fn form(&self) -> &str {
        self.entry.as_deref().unwrap_or(&self.lemma)
    }
}

impl JsonExportSource {
    /// Read at most `limit` lemmas of `path`.
    pub fn new(path: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    /// Parse export JSON.
    pub fn parse(text: &str, limit: Option<usize>, encoder: &Encoder) -> Result<Vec<LexiconEntry>> {
        let document: ExportDocument = serde_json::from_str(text)?;

        let languages: FxHashMap<&str, &str> = document
            .languages
            .iter()
            .map(|l| (l.code.as_str(), l.name.as_str()))
            .collect();

        let mut order: Vec<&str> = Vec::new();
        let mut groups: FxHashMap<&str, Vec<&ExportRecord>> = FxHashMap::default();
        for record in &document.entries {
            match groups.entry(record.lemma.as_str()) {
                Entry::Occupied(mut group) => group.get_mut().push(record),
                Entry::Vacant(slot) => {
                    order.push(record.lemma.as_str());
                    slot.insert(vec![record]);
                }
            }
        }

        let entries = order
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|lemma| {
                let records = &groups[lemma];
                let text = records
                    .iter()
                    .map(|r| r.form())
                    .find(|&form| form != lemma)
                    .unwrap_or(lemma);
                let definition = records
                    .iter()
                    .map(|r| {
                        let language = r
                            .src_lang_code
                            .as_deref()
                            .and_then(|code| languages.get(code).copied())
                            .unwrap_or("?");
                        format!(
                            "{}: {} ({})",
                            r.part_of_speech.as_deref().unwrap_or(""),
                            r.form(),
                            language
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");

                LexiconEntry::encoded(lemma, lemma, encoder)
                    .with_text(text)
                    .with_definition(definition)
            })
            .collect();

        Ok(entries)
    }
}

impl LexiconSource for JsonExportSource {
    fn describe(&self) -> String {
        format!("JSON export {}", self.path.display())
    }

    fn load(&self, encoder: &Encoder, _issues: &mut Vec<ConfigIssue>) -> Result<Vec<LexiconEntry>> {
        let text = read_text(&self.path)?;
        Self::parse(&text, self.limit, encoder).map_err(|e| match e {
            Error::SerdeJson(source) => Error::json(&self.path, source),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use crate::features::FeatureSet;
    use crate::transducer::{Encoding, EncodingPattern};

    /// ARPAbet-ish encoder: consonants +cons, vowels (with stress digits) -cons
    fn encoder() -> Encoder {
        let features = Arc::new(FeatureSet::from_names(["cons"], 1.0, -1.0));
        let mut patterns = Vec::new();
        for c in ["HH", "L", "K", "P", "N", "k", "p", "n"] {
            patterns.push(EncodingPattern::new(c, vec![vec![1.0]]));
        }
        for v in ["AH0", "OW1", "EH0", "a", "i"] {
            patterns.push(EncodingPattern::new(v, vec![vec![-1.0]]));
        }
        Encoder::new(Arc::new(Encoding::new("arpa", features, patterns)))
    }

    #[test]
    fn test_cmudict_parse() {
        let text = ";;; header\n\nhello  HH AH0 L OW1\nHELLO(2)  HH EH0 L OW1\nbroken\n";
        let mut issues = Vec::new();
        let entries = CmuDictSource::parse(text, None, &encoder(), &mut issues);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].lemma, "HELLO");
        assert_eq!(entries[0].text, "HH AH0 L OW1");
        assert_eq!(entries[0].phones, vec![vec![1.0], vec![-1.0], vec![1.0], vec![-1.0]]);
        assert_eq!(entries[1].lemma, "HELLO(2)");
        assert_eq!(
            issues,
            vec![ConfigIssue::MalformedLine {
                line: 5,
                message: "no pronunciation for 'broken'".into()
            }]
        );
    }

    #[test]
    fn test_cmudict_limit_counts_lines() {
        let text = ";;; header\nKA  K AH0\nPA  P AH0\n";
        let mut issues = Vec::new();
        let entries = CmuDictSource::parse(text, Some(2), &encoder(), &mut issues);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lemma, "KA");
    }

    #[test]
    fn test_cmudict_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NAP  N AH0 P").unwrap();
        let source = CmuDictSource::new(file.path(), None);
        let entries = source.load(&encoder(), &mut Vec::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].phones.len(), 3);
    }

    #[test]
    fn test_word_list_parse() {
        let text = "pani\twater\nkan\n\n";
        let entries = WordListSource::parse(text, None, &encoder());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].definition.as_deref(), Some("water"));
        assert_eq!(entries[0].phones, vec![vec![1.0], vec![-1.0], vec![1.0], vec![-1.0]]);
        assert_eq!(entries[1].definition, None);
    }

    #[test]
    fn test_json_export_groups_by_lemma() {
        let text = r#"{
            "languages": [{ "code": "rmn", "name": "Romani" }],
            "entries": [
                { "lemma": "pani", "partOfSpeech": "n", "definition": "water", "srcLangCode": "rmn" },
                { "lemma": "kin", "entry": "kin", "partOfSpeech": "v", "definition": "buy" },
                { "lemma": "pani", "entry": "panji", "partOfSpeech": "n", "definition": "river", "srcLangCode": "rmn" }
            ]
        }"#;
        let entries = JsonExportSource::parse(text, None, &encoder()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].lemma, "pani");
        assert_eq!(entries[0].text, "panji");
        assert_eq!(
            entries[0].definition.as_deref(),
            Some("n: pani (Romani)\nn: panji (Romani)")
        );
        assert_eq!(entries[1].text, "kin");
        assert_eq!(entries[1].definition.as_deref(), Some("v: kin (?)"));
    }

    #[test]
    fn test_json_export_definition_uses_entry_form() {
        let text = r#"{
            "languages": [{ "code": "rmn", "name": "Romani" }],
            "entries": [
                { "lemma": "pani", "entry": "panji", "partOfSpeech": "n", "definition": "water", "srcLangCode": "rmn" }
            ]
        }"#;
        let entries = JsonExportSource::parse(text, None, &encoder()).unwrap();
        assert_eq!(entries[0].definition.as_deref(), Some("n: panji (Romani)"));
    }

    #[test]
    fn test_json_export_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let source = JsonExportSource::new(file.path(), None);
        let err = source.load(&encoder(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
