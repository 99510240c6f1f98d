//! Splitting raw lines into tokens.

/// Punctuation that separates tokens besides whitespace.
pub const DEFAULT_DELIMITERS: &str = ".'-=?%,";

/// Split `line` at whitespace and at any character of `delimiters`.
///
/// Empty tokens are dropped.
///
/// # Example
///
/// ```rust
/// use phonmatch::text::{tokenize, DEFAULT_DELIMITERS};
///
/// let tokens: Vec<_> = tokenize("fachys.ykal ar,ataiin", DEFAULT_DELIMITERS).collect();
/// assert_eq!(tokens, ["fachys", "ykal", "ar", "ataiin"]);
/// ```
pub fn tokenize<'a>(line: &'a str, delimiters: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    line.split(move |c: char| c.is_whitespace() || delimiters.contains(c))
        .filter(|token| !token.is_empty())
}
