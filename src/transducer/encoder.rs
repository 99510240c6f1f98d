//! The two-pass transduction engine.
//!
//! [`Encoder::text_and_phones`] turns a raw token into output text and a
//! sequence of phones:
//!
//! 1. **Replacement pass.** The source is scanned left to right with every
//!    replacement automaton. At each start position the longest successful
//!    match (first in pattern order on ties) becomes one *cell* carrying the
//!    pattern's output text and phones. A character no rule covers becomes a
//!    one-character cell with the all-unset phone, or with a zero-length phone
//!    if it is a *modifier* (a literal of some template).
//! 2. **Template pass.** The characters of the cells are scanned again with
//!    the template automata. For each match, the phone of the cell under the
//!    wildcard is overridden with each of the template's phones; several
//!    template phones fan that cell out into sibling phones.
//!
//! The output is the concatenated cell texts, the concatenated `repr` strings,
//! and every non-empty phone in order. Zero-length modifier phones are dropped
//! once they have done their work.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::features::{FeatureSet, FeatureVector};

use super::automaton::{PatternAutomaton, ScanState};
use super::encoding::Encoding;
use super::pattern::EncodingPattern;

/// Result of transducing one token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transduction {
    /// Output text
    pub text: String,
    /// Secondary transliteration
    pub repr: String,
    /// Phones, left to right
    pub phones: Vec<FeatureVector>,
}

/// A compiled pattern: index into the encoding plus its automaton.
#[derive(Debug, Clone)]
struct Rule {
    pattern: usize,
    automaton: PatternAutomaton,
}

/// Output of the replacement pass for one span of source text.
#[derive(Debug, Clone)]
struct Cell {
    text: String,
    phones: SmallVec<[FeatureVector; 1]>,
}

/// A template match: the cell and character under the wildcard.
#[derive(Debug, Clone, Copy)]
struct Overlay {
    cell: usize,
    offset: usize,
    rule: usize,
}

/// Transduces tokens with one [`Encoding`].
///
/// Automata are compiled once, when the encoder is created. Scan state is
/// local to each call, so an encoder can be shared freely.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use phonmatch::features::FeatureSet;
/// use phonmatch::transducer::{Encoder, Encoding, EncodingPattern};
///
/// let features = Arc::new(FeatureSet::from_names(["cons", "voice"], 1.0, -1.0));
/// let th = EncodingPattern::new("th", vec![vec![1.0, -1.0]]).with_output("θ");
/// let encoding = Arc::new(Encoding::new("latin", features, vec![th]));
/// let encoder = Encoder::new(encoding);
///
/// let result = encoder.text_and_phones("path");
/// assert_eq!(result.text, "paθ");
/// assert_eq!(result.phones.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    encoding: Arc<Encoding>,
    replacements: Vec<Rule>,
    templates: Vec<Rule>,
    modifiers: FxHashSet<char>,
}

impl Encoder {
    /// Compile the patterns of `encoding`.
    pub fn new(encoding: Arc<Encoding>) -> Self {
        let mut replacements = Vec::new();
        let mut templates = Vec::new();

        for (index, pattern) in encoding.patterns().iter().enumerate() {
            let rule = Rule {
                pattern: index,
                automaton: pattern.compile(),
            };
            if rule.automaton.is_inert() {
                continue;
            }
            if pattern.is_replacement() {
                replacements.push(rule);
            } else {
                templates.push(rule);
            }
        }

        let modifiers = templates
            .iter()
            .flat_map(|rule| rule.automaton.literals())
            .collect();

        Self {
            encoding,
            replacements,
            templates,
            modifiers,
        }
    }

    /// The encoding this encoder applies.
    pub fn encoding(&self) -> &Arc<Encoding> {
        &self.encoding
    }

    /// Feature set of the produced phones.
    pub fn features(&self) -> &FeatureSet {
        self.encoding.features()
    }

    /// True if `ch` appears literally in some template.
    pub fn is_modifier(&self, ch: char) -> bool {
        self.modifiers.contains(&ch)
    }

    /// Transduce `source` into output text, `repr` text and phones.
    pub fn text_and_phones(&self, source: &str) -> Transduction {
        let chars: Vec<char> = source.chars().collect();

        let (mut cells, reprs) = self.replace(&chars);
        self.overlay(&mut cells);

        let mut result = Transduction {
            repr: reprs,
            ..Default::default()
        };
        for cell in cells {
            result.text.push_str(&cell.text);
            result
                .phones
                .extend(cell.phones.into_iter().filter(|phone| !phone.is_empty()));
        }
        result
    }

    /// Phones of `source`.
    pub fn encode(&self, source: &str) -> Vec<FeatureVector> {
        self.text_and_phones(source).phones
    }

    fn pattern(&self, rule: &Rule) -> &EncodingPattern {
        &self.encoding.patterns()[rule.pattern]
    }

    /// Replacement pass.
    fn replace(&self, chars: &[char]) -> (Vec<Cell>, String) {
        let mut cells = Vec::with_capacity(chars.len());
        let mut reprs = String::new();

        let mut start = 0;
        while start < chars.len() {
            match longest_match(&self.replacements, &chars[start..], |&ch| ch) {
                Some((index, len)) => {
                    let pattern = self.pattern(&self.replacements[index]);
                    let text = match pattern.output() {
                        Some(output) => output.to_string(),
                        None => chars[start..start + len].iter().collect(),
                    };
                    if let Some(repr) = pattern.repr() {
                        reprs.push_str(repr);
                    }
                    cells.push(Cell {
                        text,
                        phones: pattern.phones().iter().cloned().collect(),
                    });
                    start += len;
                }
                None => {
                    let ch = chars[start];
                    let phone = if self.is_modifier(ch) {
                        Vec::new()
                    } else {
                        self.features().unset_vector()
                    };
                    cells.push(Cell {
                        text: ch.to_string(),
                        phones: smallvec::smallvec![phone],
                    });
                    start += 1;
                }
            }
        }

        (cells, reprs)
    }

    /// Template pass.
    fn overlay(&self, cells: &mut [Cell]) {
        if self.templates.is_empty() {
            return;
        }

        // (character, cell index, offset within the cell)
        let stream: Vec<(char, usize, usize)> = cells
            .iter()
            .enumerate()
            .flat_map(|(cell, c)| {
                c.text
                    .chars()
                    .enumerate()
                    .map(move |(offset, ch)| (ch, cell, offset))
            })
            .collect();

        let mut overlays = Vec::new();
        let mut start = 0;
        while start < stream.len() {
            match longest_match(&self.templates, &stream[start..], |&(ch, _, _)| ch) {
                Some((index, len)) => {
                    let rule = &self.templates[index];
                    if let Some(wildcard) = rule.automaton.wildcard_offset() {
                        let (_, cell, offset) = stream[start + wildcard];
                        overlays.push(Overlay {
                            cell,
                            offset,
                            rule: index,
                        });
                    }
                    start += len;
                }
                None => start += 1,
            }
        }

        // Back to front, so fanning out a cell never shifts a pending overlay.
        let features = self.features();
        for overlay in overlays.into_iter().rev() {
            let pattern = self.pattern(&self.templates[overlay.rule]);
            let cell = &mut cells[overlay.cell];
            if cell.phones.is_empty() || pattern.phones().is_empty() {
                continue;
            }

            let index = overlay.offset.min(cell.phones.len() - 1);
            let original = cell.phones.remove(index);
            let replaced: SmallVec<[FeatureVector; 1]> = pattern
                .phones()
                .iter()
                .map(|phone| features.override_vector(&original, phone))
                .collect();
            cell.phones.insert_many(index, replaced);
        }
    }
}

/// Longest match of `rules` at the front of `input`.
///
/// Feeds one character at a time to every live automaton and remembers the
/// first rule (in rule order) to succeed at the furthest position. Scanning
/// stops as soon as no automaton is alive. Returns the rule index and the
/// match length in characters.
fn longest_match<T, F>(rules: &[Rule], input: &[T], char_of: F) -> Option<(usize, usize)>
where
    F: Fn(&T) -> char,
{
    let mut states: SmallVec<[ScanState; 32]> =
        rules.iter().map(|rule| rule.automaton.start()).collect();
    let mut best = None;

    for (consumed, item) in input.iter().enumerate() {
        let ch = char_of(item);
        let mut alive = false;
        let mut first = None;

        for (index, rule) in rules.iter().enumerate() {
            if states[index].is_failed() {
                continue;
            }
            states[index] = rule.automaton.step(states[index], ch);
            if states[index].is_failed() {
                continue;
            }
            alive = true;
            if first.is_none() && rule.automaton.is_match(states[index]) {
                first = Some(index);
            }
        }

        if let Some(index) = first {
            best = Some((index, consumed + 1));
        }
        if !alive {
            break;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUS: f64 = 1.0;
    const MINUS: f64 = -1.0;
    const UNSET: f64 = 0.0;

    /// Dimensions in canonical order: asp, cons, voice
    fn features() -> Arc<FeatureSet> {
        Arc::new(FeatureSet::from_names(["cons", "voice", "asp"], PLUS, MINUS))
    }

    fn encoder(patterns: Vec<EncodingPattern>) -> Encoder {
        Encoder::new(Arc::new(Encoding::new("test", features(), patterns)))
    }

    #[test]
    fn test_single_replacement() {
        let v = vec![UNSET, PLUS, MINUS];
        let enc = encoder(vec![EncodingPattern::new("a", vec![v.clone()])]);
        let result = enc.text_and_phones("a");
        assert_eq!(result.text, "a");
        assert_eq!(result.phones, vec![v]);
    }

    #[test]
    fn test_empty_source() {
        let enc = encoder(vec![EncodingPattern::new("a", vec![vec![UNSET, PLUS, MINUS]])]);
        let result = enc.text_and_phones("");
        assert_eq!(result, Transduction::default());
    }

    #[test]
    fn test_digraph_collapses_to_one_phone() {
        let theta = vec![UNSET, PLUS, MINUS];
        let enc = encoder(vec![
            EncodingPattern::new("th", vec![theta.clone()]).with_output("θ"),
        ]);
        let result = enc.text_and_phones("path");
        assert_eq!(result.text, "paθ");
        assert_eq!(result.phones.len(), 3);
        assert_eq!(result.phones[2], theta);
        // uncovered characters carry the unset phone
        assert_eq!(result.phones[0], vec![UNSET; 3]);
    }

    #[test]
    fn test_longest_match_wins() {
        let t = vec![UNSET, PLUS, MINUS];
        let th = vec![UNSET, PLUS, PLUS];
        let enc = encoder(vec![
            EncodingPattern::new("t", vec![t.clone()]),
            EncodingPattern::new("th", vec![th.clone()]),
        ]);
        assert_eq!(enc.encode("th"), vec![th.clone()]);
        assert_eq!(enc.encode("tt"), vec![t.clone(), t.clone()]);
        assert_eq!(enc.encode("tht"), vec![th, t]);
    }

    #[test]
    fn test_unfinished_match_falls_back_to_shorter() {
        let t = vec![UNSET, PLUS, MINUS];
        let a = vec![UNSET, MINUS, PLUS];
        let enc = encoder(vec![
            EncodingPattern::new("t", vec![t.clone()]),
            EncodingPattern::new("a", vec![a.clone()]),
            EncodingPattern::new("tha", vec![vec![PLUS, PLUS, PLUS]]),
        ]);

        // "th" starts "tha" but never finishes it; "t" was already recognized
        let result = enc.text_and_phones("thx");
        assert_eq!(result.text, "thx");
        assert_eq!(result.phones, vec![t.clone(), vec![UNSET; 3], vec![UNSET; 3]]);

        // at end of input the best recognized match is used
        assert_eq!(enc.encode("th"), vec![t, vec![UNSET; 3]]);
    }

    #[test]
    fn test_first_pattern_wins_ties() {
        let first = vec![PLUS, PLUS, PLUS];
        let second = vec![MINUS, MINUS, MINUS];
        let enc = encoder(vec![
            EncodingPattern::new("k", vec![first.clone()]),
            EncodingPattern::new("k", vec![second]),
        ]);
        assert_eq!(enc.encode("k"), vec![first]);
    }

    #[test]
    fn test_repr_is_concatenated() {
        let enc = encoder(vec![
            EncodingPattern::new("ch", vec![vec![UNSET, PLUS, MINUS]]).with_repr("tʃ"),
            EncodingPattern::new("a", vec![vec![UNSET, MINUS, PLUS]]).with_repr("ɑ"),
        ]);
        let result = enc.text_and_phones("chac");
        assert_eq!(result.text, "chac");
        assert_eq!(result.repr, "tʃɑ");
        assert_eq!(result.phones.len(), 3);
    }

    #[test]
    fn test_template_overlays_wildcard_cell() {
        let k = vec![UNSET, PLUS, MINUS];
        let aspirated = vec![PLUS, UNSET, UNSET];
        let enc = encoder(vec![
            EncodingPattern::new("k", vec![k.clone()]),
            EncodingPattern::new("_h", vec![aspirated]),
        ]);

        let result = enc.text_and_phones("kha");
        assert_eq!(result.text, "kha");
        // 'h' is a modifier: no phone of its own; 'a' is uncovered
        assert_eq!(result.phones, vec![vec![PLUS, PLUS, MINUS], vec![UNSET; 3]]);

        // without the modifier the cell is untouched
        assert_eq!(enc.encode("ka"), vec![k, vec![UNSET; 3]]);
    }

    #[test]
    fn test_template_fans_out_phones() {
        let k = vec![UNSET, PLUS, MINUS];
        let enc = encoder(vec![
            EncodingPattern::new("k", vec![k]),
            EncodingPattern::new("_:", vec![vec![PLUS, UNSET, UNSET], vec![MINUS, UNSET, PLUS]]),
        ]);
        let result = enc.text_and_phones("k:");
        assert_eq!(
            result.phones,
            vec![vec![PLUS, PLUS, MINUS], vec![MINUS, PLUS, PLUS]]
        );
    }

    #[test]
    fn test_template_after_output_replacement() {
        let theta = vec![UNSET, PLUS, MINUS];
        let enc = encoder(vec![
            EncodingPattern::new("th", vec![theta]).with_output("θ"),
            EncodingPattern::new("_'", vec![vec![PLUS, UNSET, UNSET]]),
        ]);
        // templates see the replaced text
        let result = enc.text_and_phones("th'");
        assert_eq!(result.text, "θ'");
        assert_eq!(result.phones, vec![vec![PLUS, PLUS, MINUS]]);
    }

    #[test]
    fn test_wildcard_in_middle() {
        let enc = encoder(vec![EncodingPattern::new("<_>", vec![vec![UNSET, UNSET, PLUS]])]);
        let result = enc.text_and_phones("<a>");
        assert_eq!(result.phones, vec![vec![UNSET, UNSET, PLUS]]);
    }

    #[test]
    fn test_inert_pattern_matches_nothing() {
        let enc = encoder(vec![EncodingPattern::new("a", vec![])]);
        assert_eq!(enc.encode("a"), vec![vec![UNSET; 3]]);
    }

    #[test]
    fn test_encoder_is_reentrant() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Encoder>();

        let enc = encoder(vec![EncodingPattern::new("ab", vec![vec![PLUS; 3]])]);
        // a scan abandoned halfway leaves nothing behind
        assert_eq!(enc.encode("a").len(), 1);
        assert_eq!(enc.encode("ab"), vec![vec![PLUS; 3]]);
    }
}
