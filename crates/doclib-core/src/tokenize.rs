//! Term extraction shared by document indexing and query parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::types::TermFrequencies;

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z][a-z0-9]+\b").expect("word pattern compiles"));

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "and", "or", "but", "if", "then", "else", "when", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above", "below", "to",
    "from", "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "once",
    "here", "there", "all", "each", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "just", "this", "that",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Shortest token length that survives filtering.
pub const MIN_TERM_LEN: usize = 3;

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Lower-cases `text` and counts every significant word in it.
///
/// Words start with a letter and continue with letters or digits. Stop words
/// and anything shorter than [`MIN_TERM_LEN`] are dropped.
pub fn tokenize(text: &str) -> TermFrequencies {
    let lowered = text.to_lowercase();
    let mut terms = TermFrequencies::new();
    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if word.len() < MIN_TERM_LEN || is_stop_word(word) {
            continue;
        }
        *terms.entry(word.to_string()).or_insert(0) += 1;
    }
    terms
}
