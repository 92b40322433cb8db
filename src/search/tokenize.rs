//! Query tokenization and character folding.

use regex::Regex;
use std::sync::LazyLock;

/// Minimum token length, in characters. Shorter fragments never match.
pub const MIN_TOKEN_LENGTH: usize = 2;

/// Whitespace (including the ideographic space), punctuation such as `、。・「」`
/// and symbols all separate tokens.
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{P}\p{S}]+").expect("separator pattern is valid"));

/// Lower-cases a single character without changing the character count.
///
/// Multi-character lowercase expansions keep only their first character so
/// that offsets computed on folded text index the original text directly.
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Folds a string into characters suitable for matching.
pub fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

/// Splits a query into folded tokens of at least [`MIN_TOKEN_LENGTH`] characters.
///
/// Duplicate tokens are dropped; order of first occurrence is kept.
pub fn tokenize(text: &str) -> Vec<Vec<char>> {
    let mut tokens: Vec<Vec<char>> = Vec::new();
    for piece in SEPARATORS.split(text) {
        let folded = fold(piece);
        if folded.len() >= MIN_TOKEN_LENGTH && !tokens.contains(&folded) {
            tokens.push(folded);
        }
    }
    tokens
}

/// Whether a query is blank, i.e. should match everything.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}
