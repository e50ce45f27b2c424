//! Domain types shared by the scanner, the index and the search engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Term -> occurrence count within one piece of text.
pub type TermFrequencies = HashMap<String, usize>;

/// Term -> inverse document frequency across the corpus.
pub type IdfTable = HashMap<String, f64>;

/// Source format of an indexed document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Markdown,
    Docx,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Markdown => "markdown",
            DocType::Docx => "docx",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document of the corpus as held by the index.
///
/// - `name`: file name including extension; the lookup key
/// - `path`: path the document was read from
/// - `title`: first heading / first paragraph, or the file stem
/// - `content`: full plain text used for snippets and substring search
/// - `terms`: tokenized `content`; empty for placeholder entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentEntry {
    pub name: String,
    pub path: String,
    pub doc_type: DocType,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub terms: TermFrequencies,
}

/// A ranked hit for one query. `score` is only comparable within that query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub name: String,
    pub path: String,
    pub title: String,
    pub score: f64,
    pub snippet: String,
}

/// Listing record for a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
}

impl From<&DocumentEntry> for DocumentSummary {
    fn from(entry: &DocumentEntry) -> Self {
        Self { name: entry.name.clone(), title: entry.title.clone(), doc_type: entry.doc_type }
    }
}
