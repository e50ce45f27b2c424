use doclib_core::config::SnippetConfig;
use doclib_core::tokenize::tokenize;
use doclib_core::types::{DocumentEntry, SearchResult, TermFrequencies};

use crate::index::CorpusIndex;

/// Ranked retrieval and name lookup over a built index.
pub struct Searcher<'a> {
    index: &'a CorpusIndex,
    snippet: SnippetConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self { index, snippet: SnippetConfig::default() }
    }

    pub fn with_snippet(mut self, snippet: SnippetConfig) -> Self {
        self.snippet = snippet;
        self
    }

    /// TF-IDF ranking; queries without any significant term fall back to a
    /// case-insensitive substring match with a flat score of 1.0.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        if self.index.is_empty() || top_k == 0 {
            return Vec::new();
        }
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return self.substring_search(query, top_k);
        }

        let needles: Vec<&str> = query_terms.keys().map(String::as_str).collect();
        let mut results: Vec<SearchResult> = self
            .index
            .entries()
            .iter()
            .filter_map(|entry| {
                let score = self.score(&query_terms, entry);
                (score > 0.0).then(|| self.result(entry, score, &needles))
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        results
    }

    /// `Σ tf(t, doc) × idf(t) × qf(t)` over query terms present in `entry`.
    pub fn score(&self, query_terms: &TermFrequencies, entry: &DocumentEntry) -> f64 {
        query_terms
            .iter()
            .filter_map(|(term, &query_freq)| {
                let tf = *entry.terms.get(term)?;
                Some(tf as f64 * self.index.idf_of(term) * query_freq as f64)
            })
            .sum()
    }

    fn substring_search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        let needle = fold_chars(query);
        self.index
            .entries()
            .iter()
            .filter(|entry| find_folded(&fold_chars(&entry.content), &needle).is_some())
            .take(top_k)
            .map(|entry| self.result(entry, 1.0, &[query]))
            .collect()
    }

    fn result(&self, entry: &DocumentEntry, score: f64, needles: &[&str]) -> SearchResult {
        SearchResult {
            name: entry.name.clone(),
            path: entry.path.clone(),
            title: entry.title.clone(),
            score,
            snippet: extract_snippet(&entry.content, needles, &self.snippet),
        }
    }

    /// Exact name, then case-insensitive name, then case-insensitive
    /// substring of the name; first match in corpus order wins.
    pub fn get_document(&self, name: &str) -> Option<&'a DocumentEntry> {
        let entries = self.index.entries();
        if let Some(entry) = self.index.get(name) {
            return Some(entry);
        }
        let wanted = name.to_lowercase();
        entries
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
            .or_else(|| entries.iter().find(|e| e.name.to_lowercase().contains(&wanted)))
    }
}

/// Excerpt of `content` around the earliest case-insensitive occurrence of
/// any needle (or the start of the document when none occurs).
///
/// Offsets are in characters. Whitespace runs collapse to one space and
/// `...` marks a cut at either end.
pub fn extract_snippet(content: &str, needles: &[&str], config: &SnippetConfig) -> String {
    let chars: Vec<char> = content.chars().collect();
    let folded: Vec<char> = chars.iter().map(|&c| fold(c)).collect();
    let first_hit = needles
        .iter()
        .filter_map(|needle| find_folded(&folded, &fold_chars(needle)))
        .min()
        .unwrap_or(0);

    let start = first_hit.saturating_sub(config.lead);
    let end = (start + config.max_len).min(chars.len());
    let window: String = chars[start..end].iter().collect();

    let mut snippet = window.split_whitespace().collect::<Vec<_>>().join(" ");
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

// One char in, one char out, so folded offsets line up with the unfolded text.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn fold_chars(text: &str) -> Vec<char> {
    text.chars().map(fold).collect()
}

fn find_folded(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_len: usize) -> SnippetConfig {
        SnippetConfig { max_len, lead: 30 }
    }

    #[test]
    fn snippet_short_content_has_no_ellipsis() {
        let snippet = extract_snippet("Short   text\n\nhere", &["text"], &config(150));
        assert_eq!(snippet, "Short text here");
    }

    #[test]
    fn snippet_window_starts_thirty_chars_before_hit() {
        let content = format!("{}needle{}", "a".repeat(50), "b".repeat(200));
        let snippet = extract_snippet(&content, &["NEEDLE"], &config(150));
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        let body = snippet.trim_start_matches("...").trim_end_matches("...");
        assert_eq!(body.chars().count(), 150);
        assert!(body.starts_with(&"a".repeat(30)));
        assert!(body[30..].starts_with("needle"));
    }

    #[test]
    fn snippet_without_hit_starts_at_beginning() {
        let content = "This is some content without the search term, padded out a little further.";
        let snippet = extract_snippet(content, &["missing"], &config(20));
        assert_eq!(snippet, "This is some content...");
    }

    #[test]
    fn snippet_uses_earliest_of_several_terms() {
        let content = format!("{}zeta {}alpha", "x ".repeat(40), "y ".repeat(40));
        let snippet = extract_snippet(&content, &["alpha", "zeta"], &config(40));
        assert!(snippet.contains("zeta"));
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let content = format!("{}target", "é".repeat(40));
        let snippet = extract_snippet(&content, &["target"], &config(150));
        assert_eq!(snippet, format!("...{}target", "é".repeat(30)));
    }

    #[test]
    fn folded_search_is_case_insensitive() {
        assert_eq!(find_folded(&fold_chars("Hello World"), &fold_chars("WORLD")), Some(6));
        assert_eq!(find_folded(&fold_chars("abc"), &fold_chars("abcd")), None);
        assert_eq!(find_folded(&fold_chars("abc"), &[]), Some(0));
    }
}
