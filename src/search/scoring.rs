//! Approximate substring scoring.
//!
//! A token is compared against every window of a field value whose length is
//! within the allowed error budget of the token length. The best window wins
//! regardless of where it sits in the value. Scores are normalized Levenshtein
//! distances: 0 is an exact match, 1 shares nothing.

use super::tokenize::MIN_TOKEN_LENGTH;
use rapidfuzz::distance::levenshtein;

/// Best approximate occurrence of a token inside a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMatch {
    pub score: f64,
    /// Character offset of the first matched character.
    pub start: usize,
    /// Character offset one past the last matched character.
    pub end: usize,
}

/// Finds the best-scoring window of `text` for `token`.
///
/// Returns `None` when no window scores at or below `threshold`. Exact
/// occurrences short-circuit with score 0; the earliest window wins ties.
pub fn best_window(token: &[char], text: &[char], threshold: f64) -> Option<WindowMatch> {
    let n = token.len();
    if n < MIN_TOKEN_LENGTH || text.len() < MIN_TOKEN_LENGTH {
        return None;
    }

    if let Some(start) = text.windows(n).position(|window| window == token) {
        return Some(WindowMatch {
            score: 0.0,
            start,
            end: start + n,
        });
    }

    let allowed = allowed_errors(n, threshold);
    if allowed == 0 {
        return None;
    }

    let min_len = n.saturating_sub(allowed).max(MIN_TOKEN_LENGTH);
    let max_len = (n + allowed).min(text.len());

    let mut best: Option<WindowMatch> = None;
    for len in min_len..=max_len {
        for start in 0..=(text.len() - len) {
            let window = &text[start..start + len];
            let score = levenshtein::normalized_distance(token.iter().copied(), window.iter().copied());
            if best.is_none_or(|b| score < b.score) {
                best = Some(WindowMatch {
                    score,
                    start,
                    end: start + len,
                });
            }
        }
    }

    best.filter(|b| b.score <= threshold)
}

/// Number of edits a token of length `n` may absorb under `threshold`.
pub fn allowed_errors(n: usize, threshold: f64) -> usize {
    (n as f64 * threshold).floor() as usize
}

/// Combines the per-field scores of one query token.
///
/// Each field the token matched in contributes `score ^ weight`; contributions multiply.
/// Heavier fields pull a partial score further towards 0, any exact field match
/// yields 0, and matching in more fields never makes a record worse.
pub fn combine(fields: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    fields
        .into_iter()
        .map(|(score, weight)| score.clamp(0.0, 1.0).powf(weight))
        .product()
}
