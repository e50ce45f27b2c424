//! Corpus discovery and plain-text extraction.
//!
//! The scanner walks the corpus root, turns every markdown and `.docx` file
//! into a [`DocumentEntry`] and reports what happened to each file as a
//! [`ScanOutcome`]. It never fails as a whole: a missing root yields nothing,
//! a broken file yields `Skipped`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::tokenize::tokenize;
use crate::traits::RichTextDecoder;
use crate::types::{DocType, DocumentEntry, TermFrequencies};

/// Lines searched for a `# ` heading before falling back to the file stem.
const TITLE_SEARCH_LINES: usize = 10;
/// Characters of the first paragraph kept as a `.docx` title.
const DOCX_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Indexed(DocumentEntry),
    /// Listed but not searchable: no decoder for its format.
    Placeholder(DocumentEntry),
    Skipped { path: PathBuf, reason: String },
}

impl ScanOutcome {
    pub fn entry(&self) -> Option<&DocumentEntry> {
        match self {
            ScanOutcome::Indexed(e) | ScanOutcome::Placeholder(e) => Some(e),
            ScanOutcome::Skipped { .. } => None,
        }
    }

    pub fn into_entry(self) -> Option<DocumentEntry> {
        match self {
            ScanOutcome::Indexed(e) | ScanOutcome::Placeholder(e) => Some(e),
            ScanOutcome::Skipped { .. } => None,
        }
    }
}

pub struct CorpusScanner {
    max_depth: usize,
    decoder: Option<Box<dyn RichTextDecoder>>,
}

impl Default for CorpusScanner {
    fn default() -> Self {
        Self { max_depth: 1, decoder: default_decoder() }
    }
}

impl CorpusScanner {
    pub fn new() -> Self { Self::default() }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Replace the rich-text decoder; `None` turns `.docx` files into placeholders.
    pub fn with_decoder(mut self, decoder: Option<Box<dyn RichTextDecoder>>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Markdown files first, then `.docx`, each group in path order.
    pub fn scan(&self, root: &Path) -> Vec<ScanOutcome> {
        if !root.is_dir() {
            tracing::info!(root = %root.display(), "corpus root not found; nothing to scan");
            return Vec::new();
        }
        let (markdown, docx) = self.list_files(root);
        tracing::debug!(markdown = markdown.len(), docx = docx.len(), "scanning corpus {}", root.display());

        let mut outcomes = Vec::with_capacity(markdown.len() + docx.len());
        outcomes.extend(markdown.iter().map(|p| self.scan_markdown(p)));
        outcomes.extend(docx.iter().map(|p| self.scan_docx(p)));
        for outcome in &outcomes {
            if let ScanOutcome::Skipped { path, reason } = outcome {
                tracing::warn!(path = %path.display(), %reason, "skipping document");
            }
        }
        outcomes
    }

    pub fn scan_markdown(&self, path: &Path) -> ScanOutcome {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return skipped(path, crate::Error::io(path, e)),
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => return skipped(path, crate::Error::parse(path, e)),
        };
        let title = extract_title(&content, &file_stem(path));
        let terms = tokenize(&content);
        tracing::debug!(path = %path.display(), terms = terms.len(), "indexed markdown");
        ScanOutcome::Indexed(entry(path, DocType::Markdown, title, content, terms))
    }

    pub fn scan_docx(&self, path: &Path) -> ScanOutcome {
        let name = file_name(path);
        let Some(decoder) = &self.decoder else {
            let content = format!("[Word document - build with the `docx` feature to index: {name}]");
            return ScanOutcome::Placeholder(entry(path, DocType::Docx, file_stem(path), content, TermFrequencies::new()));
        };
        let paragraphs: Vec<String> = match decoder.paragraphs(path) {
            Ok(paragraphs) => paragraphs.into_iter().filter(|p| !p.trim().is_empty()).collect(),
            Err(e) => return skipped(path, e),
        };
        let title = paragraphs
            .first()
            .map(|p| p.chars().take(DOCX_TITLE_CHARS).collect())
            .unwrap_or_else(|| file_stem(path));
        let content = paragraphs.join("\n");
        let terms = tokenize(&content);
        tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "indexed docx");
        ScanOutcome::Indexed(entry(path, DocType::Docx, title, content, terms))
    }

    fn list_files(&self, root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut markdown = Vec::new();
        let mut docx = Vec::new();
        for entry in walkdir::WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable corpus entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            match path.extension().and_then(|s| s.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("md") => markdown.push(path.to_path_buf()),
                Some(ext) if ext.eq_ignore_ascii_case("docx") => docx.push(path.to_path_buf()),
                _ => {}
            }
        }
        markdown.sort();
        docx.sort();
        (markdown, docx)
    }
}

/// Text of the first `# ` heading within the first lines, else `fallback`.
pub fn extract_title(content: &str, fallback: &str) -> String {
    content
        .split('\n')
        .take(TITLE_SEARCH_LINES)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(feature = "docx")]
fn default_decoder() -> Option<Box<dyn RichTextDecoder>> {
    Some(Box::new(crate::docx::DocxDecoder))
}

#[cfg(not(feature = "docx"))]
fn default_decoder() -> Option<Box<dyn RichTextDecoder>> {
    None
}

fn entry(path: &Path, doc_type: DocType, title: String, content: String, terms: TermFrequencies) -> DocumentEntry {
    DocumentEntry {
        name: file_name(path),
        path: path.to_string_lossy().to_string(),
        doc_type,
        title,
        content,
        terms,
    }
}

fn skipped(path: &Path, error: crate::Error) -> ScanOutcome {
    ScanOutcome::Skipped { path: path.to_path_buf(), reason: error.to_string() }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}
