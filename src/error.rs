//! Error types.
//!
//! Two kinds of problems are distinguished:
//!
//! - [`Error`] covers hard failures (unreadable files, malformed JSON) that
//!   prevent an operation from producing any result at all.
//! - [`ConfigIssue`] covers configuration and data defects (unknown feature
//!   names, malformed pattern templates, duplicate lemmas). These are never
//!   raised; the owning object records them as an [`ErrorRecord`] and carries
//!   on with a best-effort fallback so one bad record never aborts a run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Hard failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reading a configuration, lexicon or input file.
    #[error("unable to read '{path}': {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON document.
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        /// File being parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// I/O error without file context.
    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    /// JSON error without file context.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

/// A specialized `Result` type for hard failures.
pub type Result<T> = std::result::Result<T, Error>;

/// A configuration or data defect that is recorded rather than raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// The feature set has no dimensions.
    #[error("no features are defined")]
    NoFeatures,

    /// A dimension alias contains non-word characters.
    #[error("invalid feature name '{0}'; must be only word characters")]
    InvalidFeatureName(String),

    /// The same alias names two dimensions.
    #[error("duplicate feature name '{0}'")]
    DuplicateFeatureName(String),

    /// A feature spec is not of the form `+Name` or `-Name`.
    #[error("invalid feature specification '{0}'")]
    InvalidFeatureSpec(String),

    /// A feature spec names no known dimension.
    #[error("unknown feature name '{0}'")]
    UnknownFeatureName(String),

    /// A pattern has an empty input template.
    #[error("empty input template")]
    EmptyInput,

    /// A pattern gives neither feature specs nor an IPA string.
    #[error("no feature specification or IPA string for '{0}'")]
    MissingPhones(String),

    /// A pattern gives both feature specs and an IPA string.
    #[error("both feature specification and IPA string given for '{0}'")]
    AmbiguousPhones(String),

    /// A feature spec inside a pattern is defective.
    #[error("error in feature spec for '{input}': {issue}")]
    PatternFeature {
        /// Pattern input
        input: String,
        /// Underlying feature issue
        issue: Box<ConfigIssue>,
    },

    /// A pattern uses an IPA string but no `ipa` encoding is configured.
    #[error("IPA string given for '{0}' but no 'ipa' encoding is available")]
    NoIpaEncoding(String),

    /// The `ipa` encoding is built on a feature set of a different size.
    #[error("'ipa' encoding has {ipa} dimensions but feature set '{features}' has {expected}")]
    FeatureSetMismatch {
        /// Feature set of the referencing encoding
        features: String,
        /// Its dimension count
        expected: usize,
        /// Dimension count of the IPA encoding's feature set
        ipa: usize,
    },

    /// The IPA string of a pattern produced no phones.
    #[error("IPA string '{ipa}' for '{input}' produced no phones")]
    EmptyIpa {
        /// Pattern input
        input: String,
        /// IPA string
        ipa: String,
    },

    /// A template has more than one wildcard and is treated literally.
    #[error("template '{0}' has more than one wildcard; treated as a literal replacement")]
    MultipleWildcards(String),

    /// Two lexicon entries share a lemma.
    #[error("duplicate lemma '{0}'")]
    DuplicateLemma(String),

    /// A lexicon could not be loaded.
    #[error("unable to load lexicon: {0}")]
    LexiconLoad(String),

    /// A lexicon line could not be parsed.
    #[error("line {line}: {message}")]
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A reference to another configuration object could not be resolved.
    #[error("unknown {kind} '{id}'")]
    UnknownReference {
        /// Kind of object referenced (feature set, encoding, lexicon, ...)
        kind: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// A configuration object could not be read.
    #[error("{0}")]
    Load(String),
}

/// A recorded [`ConfigIssue`] together with the object that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Identity of the owning object, e.g. `encoding 'voynich'`
    pub owner: String,
    /// The recorded problem
    pub issue: ConfigIssue,
}

impl ErrorRecord {
    /// Create a record for `owner`.
    pub fn new(owner: impl Into<String>, issue: ConfigIssue) -> Self {
        Self {
            owner: owner.into(),
            issue,
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.owner, self.issue)
    }
}

/// Record `issue` for `owner`, logging it as a warning.
pub(crate) fn record(errors: &mut Vec<ErrorRecord>, owner: &str, issue: ConfigIssue) {
    tracing::warn!(owner, %issue, "configuration problem");
    errors.push(ErrorRecord::new(owner, issue));
}
