//! Single-file JSON cache of the corpus index.
//!
//! The cache only saves a rebuild. Anything short of a clean read is reported
//! as [`CacheLoad::Missing`] or [`CacheLoad::Invalid`] and the caller rebuilds
//! from source.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use doclib_core::types::{DocumentEntry, IdfTable};
use doclib_core::Error;

use crate::index::CorpusIndex;

#[derive(Serialize)]
struct CacheRecordRef<'a> {
    entries: &'a [DocumentEntry],
    idf: &'a IdfTable,
}

#[derive(Deserialize)]
struct CacheRecord {
    entries: Vec<DocumentEntry>,
    idf: IdfTable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLoad {
    Loaded(CorpusIndex),
    Missing,
    Invalid(String),
}

impl CacheLoad {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLoad::Loaded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn save(&self, index: &CorpusIndex) -> doclib_core::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let record = CacheRecordRef { entries: index.entries(), idf: index.idf() };
        let json = serde_json::to_string_pretty(&record).map_err(|e| Error::parse(&self.path, e))?;
        fs::write(&self.path, json).map_err(|e| Error::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), entries = index.len(), "saved index cache");
        Ok(())
    }

    pub fn load(&self) -> CacheLoad {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return CacheLoad::Missing,
            Err(e) => return CacheLoad::Invalid(Error::io(&self.path, e).to_string()),
        };
        match serde_json::from_str::<CacheRecord>(&data) {
            Ok(record) => {
                tracing::debug!(path = %self.path.display(), entries = record.entries.len(), "loaded index cache");
                CacheLoad::Loaded(CorpusIndex::from_parts(record.entries, record.idf))
            }
            Err(e) => CacheLoad::Invalid(Error::parse(&self.path, e).to_string()),
        }
    }
}
