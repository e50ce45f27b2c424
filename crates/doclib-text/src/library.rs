//! The document library: owns the index and answers the shell's queries.
//!
//! A library starts [`LibraryState::Uninitialized`]. The first query (or an
//! explicit [`DocumentLibrary::initialize`]) loads the cached index or builds
//! one, after which it is [`LibraryState::Ready`] until the process ends or a
//! rebuild swaps in a new index.
use std::path::{Path, PathBuf};

use doclib_core::config::{DuplicatePolicy, LibraryConfig, SnippetConfig};
use doclib_core::scanner::CorpusScanner;
use doclib_core::traits::DocumentStore;
use doclib_core::types::{DocumentSummary, SearchResult};

use crate::cache::{CacheLoad, CacheStore};
use crate::index::{BuildReport, CorpusIndex, IndexBuilder};
use crate::search::Searcher;

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryState {
    Uninitialized,
    Ready(CorpusIndex),
}

/// Where the index came from on [`DocumentLibrary::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    AlreadyReady,
    Cache,
    Built,
}

pub struct DocumentLibrary {
    builder: IndexBuilder,
    cache: Option<CacheStore>,
    snippet: SnippetConfig,
    default_top_k: usize,
    state: LibraryState,
    last_build: Option<BuildReport>,
}

impl DocumentLibrary {
    /// A library over `corpus_root` with no on-disk cache.
    pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
        Self {
            builder: IndexBuilder::new(corpus_root),
            cache: None,
            snippet: SnippetConfig::default(),
            default_top_k: LibraryConfig::default().default_top_k,
            state: LibraryState::Uninitialized,
            last_build: None,
        }
    }

    /// Relative paths in `config` resolve against `base`.
    pub fn from_config(config: &LibraryConfig, base: &Path) -> Self {
        let scanner = CorpusScanner::new().with_max_depth(config.scan.max_depth);
        let mut library = Self::new(config.corpus_root(base))
            .with_scanner(scanner)
            .with_duplicate_policy(config.scan.duplicate_policy)
            .with_snippet_config(config.snippet.clone());
        library.default_top_k = config.default_top_k;
        match config.cache_path(base) {
            Some(path) => library.with_cache(path),
            None => library,
        }
    }

    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        let cache = CacheStore::new(path);
        self.builder = self.builder.with_cache(Some(cache.clone()));
        self.cache = Some(cache);
        self
    }

    pub fn with_scanner(mut self, scanner: CorpusScanner) -> Self {
        self.builder = self.builder.with_scanner(scanner);
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.builder = self.builder.with_duplicate_policy(policy);
        self
    }

    pub fn with_snippet_config(mut self, snippet: SnippetConfig) -> Self {
        self.snippet = snippet;
        self
    }

    pub fn corpus_root(&self) -> &Path { self.builder.root() }

    pub fn cache(&self) -> Option<&CacheStore> { self.cache.as_ref() }

    pub fn default_top_k(&self) -> usize { self.default_top_k }

    pub fn state(&self) -> &LibraryState { &self.state }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LibraryState::Ready(_))
    }

    /// Report of the most recent build in this process, if any ran.
    pub fn last_build(&self) -> Option<&BuildReport> { self.last_build.as_ref() }

    /// Load the cached index, or build from source when the cache is absent
    /// or unreadable. Does nothing once the library is ready.
    pub fn initialize(&mut self) -> LoadSource {
        if self.is_ready() {
            return LoadSource::AlreadyReady;
        }
        if let Some(cache) = &self.cache {
            match cache.load() {
                CacheLoad::Loaded(index) => {
                    tracing::info!(entries = index.len(), path = %cache.path().display(), "loaded document index from cache");
                    self.state = LibraryState::Ready(index);
                    return LoadSource::Cache;
                }
                CacheLoad::Missing => tracing::debug!(path = %cache.path().display(), "no index cache; building"),
                CacheLoad::Invalid(reason) => tracing::warn!(%reason, "ignoring unreadable index cache; building"),
            }
        }
        self.rebuild();
        LoadSource::Built
    }

    /// Scan the corpus and replace the index; returns the entry count.
    ///
    /// Every call rescans, whatever `force` says. Only [`Self::initialize`]
    /// reads the cache.
    pub fn build(&mut self, force: bool) -> usize {
        tracing::debug!(force, ready = self.is_ready(), "rebuilding document index");
        self.rebuild()
    }

    fn rebuild(&mut self) -> usize {
        let (index, report) = self.builder.build();
        let count = index.len();
        self.state = LibraryState::Ready(index);
        self.last_build = Some(report);
        count
    }

    fn searcher(&mut self) -> Option<Searcher<'_>> {
        self.initialize();
        match &self.state {
            LibraryState::Ready(index) => Some(Searcher::new(index).with_snippet(self.snippet.clone())),
            LibraryState::Uninitialized => None,
        }
    }
}

impl DocumentStore for DocumentLibrary {
    fn search(&mut self, query: &str, top_k: usize) -> Vec<SearchResult> {
        self.searcher().map(|s| s.search(query, top_k)).unwrap_or_default()
    }

    fn get_document(&mut self, name: &str) -> Option<String> {
        self.searcher()?.get_document(name).map(|entry| entry.content.clone())
    }

    fn list_documents(&mut self) -> Vec<DocumentSummary> {
        self.initialize();
        match &self.state {
            LibraryState::Ready(index) => index.entries().iter().map(DocumentSummary::from).collect(),
            LibraryState::Uninitialized => Vec::new(),
        }
    }

    fn refresh(&mut self) -> usize {
        self.build(true)
    }
}
