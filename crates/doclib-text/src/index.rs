use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use doclib_core::config::DuplicatePolicy;
use doclib_core::scanner::{CorpusScanner, ScanOutcome};
use doclib_core::types::{DocumentEntry, IdfTable};

use crate::cache::CacheStore;

/// All documents of the corpus plus the IDF table derived from them.
///
/// Entries keep first-insertion order; that order is the corpus iteration
/// order used for listings, substring search and tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusIndex {
    entries: Vec<DocumentEntry>,
    idf: IdfTable,
}

/// What [`CorpusIndex::insert`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    Replaced,
    Ignored,
}

impl CorpusIndex {
    pub fn new() -> Self { Self::default() }

    /// Index over `entries` with a freshly computed IDF table. Later entries
    /// overwrite earlier ones with the same name.
    pub fn from_entries(entries: impl IntoIterator<Item = DocumentEntry>) -> Self {
        let mut index = Self::new();
        for entry in entries {
            index.insert(entry, DuplicatePolicy::Overwrite);
        }
        index.recompute_idf();
        index
    }

    /// Reassemble an index from persisted parts without recomputing IDF.
    pub(crate) fn from_parts(entries: Vec<DocumentEntry>, idf: IdfTable) -> Self {
        Self { entries, idf }
    }

    /// Does not touch the IDF table; call [`CorpusIndex::recompute_idf`] once
    /// all entries are in.
    pub fn insert(&mut self, entry: DocumentEntry, policy: DuplicatePolicy) -> Insertion {
        match self.entries.iter().position(|e| e.name == entry.name) {
            None => {
                self.entries.push(entry);
                Insertion::Added
            }
            Some(pos) => match policy {
                DuplicatePolicy::Overwrite => {
                    self.entries[pos] = entry;
                    Insertion::Replaced
                }
                DuplicatePolicy::KeepFirst => Insertion::Ignored,
            },
        }
    }

    pub fn recompute_idf(&mut self) {
        self.idf = compute_idf(&self.entries);
    }

    pub fn entries(&self) -> &[DocumentEntry] { &self.entries }

    pub fn idf(&self) -> &IdfTable { &self.idf }

    pub fn idf_of(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    pub fn get(&self, name: &str) -> Option<&DocumentEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// `idf[t] = ln(N / df(t))` over every term present in at least one entry.
/// A term in every document scores 0; an empty corpus yields an empty table.
pub fn compute_idf(entries: &[DocumentEntry]) -> IdfTable {
    if entries.is_empty() {
        return IdfTable::new();
    }
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        for term in entry.terms.keys() {
            *doc_freq.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let total = entries.len() as f64;
    doc_freq
        .into_iter()
        .map(|(term, count)| (term.to_string(), (total / count as f64).ln()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a build did besides producing the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub root: PathBuf,
    pub root_found: bool,
    pub entries: usize,
    pub placeholders: usize,
    pub skipped: Vec<SkippedDocument>,
    /// Names seen more than once, in the order the collisions happened.
    pub duplicates: Vec<String>,
    pub cache_saved: bool,
}

impl BuildReport {
    pub fn entry_count(&self) -> usize { self.entries }
}

pub struct IndexBuilder {
    root: PathBuf,
    scanner: CorpusScanner,
    policy: DuplicatePolicy,
    cache: Option<CacheStore>,
}

impl IndexBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), scanner: CorpusScanner::new(), policy: DuplicatePolicy::default(), cache: None }
    }

    pub fn with_scanner(mut self, scanner: CorpusScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache(mut self, cache: Option<CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Full scan of the corpus into a new index.
    ///
    /// The index is written to the cache when one is configured and the root
    /// exists; a failed write is logged and reported, never returned.
    pub fn build(&self) -> (CorpusIndex, BuildReport) {
        let mut report = BuildReport { root: self.root.clone(), ..BuildReport::default() };
        if !self.root.is_dir() {
            tracing::info!(root = %self.root.display(), "corpus root does not exist; index is empty");
            return (CorpusIndex::new(), report);
        }
        report.root_found = true;

        let mut index = CorpusIndex::new();
        for outcome in self.scanner.scan(&self.root) {
            let entry = match outcome {
                ScanOutcome::Indexed(entry) => entry,
                ScanOutcome::Placeholder(entry) => {
                    report.placeholders += 1;
                    entry
                }
                ScanOutcome::Skipped { path, reason } => {
                    report.skipped.push(SkippedDocument { path, reason });
                    continue;
                }
            };
            let name = entry.name.clone();
            match index.insert(entry, self.policy) {
                Insertion::Added => {}
                Insertion::Replaced => {
                    tracing::warn!(%name, "duplicate document name; later file replaces the earlier entry");
                    report.duplicates.push(name);
                }
                Insertion::Ignored => {
                    tracing::warn!(%name, "duplicate document name; keeping the first entry");
                    report.duplicates.push(name);
                }
            }
        }
        index.recompute_idf();
        report.entries = index.len();

        if let Some(cache) = &self.cache {
            match cache.save(&index) {
                Ok(()) => report.cache_saved = true,
                Err(e) => tracing::warn!(error = %e, "could not write index cache; continuing in memory"),
            }
        }
        tracing::info!(
            entries = report.entries,
            skipped = report.skipped.len(),
            terms = index.idf().len(),
            "built document index from {}",
            self.root.display()
        );
        (index, report)
    }
}
