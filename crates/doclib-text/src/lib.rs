//! doclib-text
//!
//! TF-IDF indexing and search over the document library. `index` builds the
//! corpus index, `search` ranks and snippets, `cache` persists the index and
//! `library` ties them together behind [`doclib_core::traits::DocumentStore`].
pub mod cache;
pub mod index;
pub mod library;
pub mod search;

pub use cache::{CacheLoad, CacheStore};
pub use index::{BuildReport, CorpusIndex, IndexBuilder, Insertion, SkippedDocument};
pub use library::{DocumentLibrary, LibraryState, LoadSource};
pub use search::{extract_snippet, Searcher};
