use std::path::Path;

use crate::types::{DocumentSummary, SearchResult};

/// Extracts paragraph text from a rich-text document (e.g. `.docx`).
pub trait RichTextDecoder: Send + Sync {
    fn paragraphs(&self, path: &Path) -> crate::Result<Vec<String>>;
}

/// The query surface handed to the shell and command layer.
///
/// None of these calls fail: degraded states show up as empty results or
/// `None`.
pub trait DocumentStore {
    fn search(&mut self, query: &str, top_k: usize) -> Vec<SearchResult>;
    fn get_document(&mut self, name: &str) -> Option<String>;
    fn list_documents(&mut self) -> Vec<DocumentSummary>;
    fn refresh(&mut self) -> usize;
}
