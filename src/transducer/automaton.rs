//! Character automata compiled from pattern templates.
//!
//! A template is a literal character sequence in which at most one position
//! may be the [`WILDCARD`] marker, matching any single character. Compiling a
//! template yields a deterministic automaton whose states are simply "number
//! of characters consumed so far" plus a dead state.
//!
//! The automaton itself is immutable. Scan progress lives in a separate
//! [`ScanState`] value that the caller threads through [`PatternAutomaton::step`],
//! so one compiled automaton can serve any number of concurrent scans.

use smallvec::SmallVec;

/// The wildcard marker in pattern templates.
pub const WILDCARD: char = '_';

/// A single edge of a compiled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Accepts exactly this character
    Literal(char),
    /// Accepts any character
    Any,
}

impl Transition {
    #[inline]
    fn accepts(self, ch: char) -> bool {
        match self {
            Transition::Literal(expected) => expected == ch,
            Transition::Any => true,
        }
    }
}

/// Progress of one automaton over the current scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// This many characters have been accepted
    Active(usize),
    /// Some character was rejected; no further input can be accepted
    Failed,
}

impl ScanState {
    /// True once the automaton has rejected input.
    #[inline]
    pub fn is_failed(self) -> bool {
        matches!(self, ScanState::Failed)
    }
}

/// A deterministic automaton recognising one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternAutomaton {
    transitions: SmallVec<[Transition; 8]>,
    wildcard: Option<usize>,
}

impl PatternAutomaton {
    /// Compile a literal template; every character, including [`WILDCARD`],
    /// must match exactly.
    pub fn literal(template: &str) -> Self {
        Self {
            transitions: template.chars().map(Transition::Literal).collect(),
            wildcard: None,
        }
    }

    /// Compile a template whose character at `offset` matches anything.
    ///
    /// Returns `None` when `offset` is outside the template.
    pub fn template(template: &str, offset: usize) -> Option<Self> {
        let transitions: SmallVec<[Transition; 8]> = template
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                if i == offset {
                    Transition::Any
                } else {
                    Transition::Literal(ch)
                }
            })
            .collect();

        if offset >= transitions.len() {
            return None;
        }

        Some(Self {
            transitions,
            wildcard: Some(offset),
        })
    }

    /// An automaton that rejects everything.
    ///
    /// Used for patterns whose configuration is defective.
    pub fn inert() -> Self {
        Self {
            transitions: SmallVec::new(),
            wildcard: None,
        }
    }

    /// True if this automaton can never match.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Number of characters in a match.
    #[inline]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// True if the automaton has no transitions (see [`is_inert`](Self::is_inert)).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Position of the wildcard within a match, for templates.
    #[inline]
    pub fn wildcard_offset(&self) -> Option<usize> {
        self.wildcard
    }

    /// Literal characters of the template, excluding the wildcard position.
    pub fn literals(&self) -> impl Iterator<Item = char> + '_ {
        self.transitions.iter().filter_map(|t| match *t {
            Transition::Literal(ch) => Some(ch),
            Transition::Any => None,
        })
    }

    /// Initial scan state.
    #[inline]
    pub fn start(&self) -> ScanState {
        if self.is_inert() {
            ScanState::Failed
        } else {
            ScanState::Active(0)
        }
    }

    /// Advance `state` by one input character.
    #[inline]
    pub fn step(&self, state: ScanState, ch: char) -> ScanState {
        match state {
            ScanState::Active(consumed) => match self.transitions.get(consumed) {
                Some(t) if t.accepts(ch) => ScanState::Active(consumed + 1),
                _ => ScanState::Failed,
            },
            ScanState::Failed => ScanState::Failed,
        }
    }

    /// True if `state` has accepted a complete match.
    #[inline]
    pub fn is_match(&self, state: ScanState) -> bool {
        !self.is_inert() && state == ScanState::Active(self.transitions.len())
    }

    /// True if the whole of `text` is a match.
    pub fn matches(&self, text: &str) -> bool {
        let state = text
            .chars()
            .fold(self.start(), |state, ch| self.step(state, ch));
        self.is_match(state)
    }
}
