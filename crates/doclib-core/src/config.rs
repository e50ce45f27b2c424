//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge defaults + `config.toml` + `config.<env>.toml` +
//! `APP_*` env vars. Provides helpers to expand `~` and `${VAR}` and to
//! resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// What to do when two documents in the corpus share a file name.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last writer wins; the earlier entry keeps its position in the corpus.
    #[default]
    Overwrite,
    /// First writer wins; later documents with the same name are skipped.
    KeepFirst,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetConfig {
    pub max_len: usize,
    pub lead: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self { max_len: 150, lead: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// 1 scans only the files directly inside the corpus root.
    pub max_depth: usize,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_depth: 1, duplicate_policy: DuplicatePolicy::Overwrite }
    }
}

/// Settings for the document library, read from the `library` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LibraryConfig {
    pub corpus_root: String,
    /// Empty disables the on-disk cache.
    pub cache_path: String,
    pub default_top_k: usize,
    pub snippet: SnippetConfig,
    pub scan: ScanConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            corpus_root: "docs/library".to_string(),
            cache_path: "config/knowledge_index.json".to_string(),
            default_top_k: 5,
            snippet: SnippetConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl LibraryConfig {
    pub fn corpus_root(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.corpus_root)
    }

    pub fn cache_path(&self, base: &Path) -> Option<PathBuf> {
        if self.cache_path.trim().is_empty() {
            None
        } else {
            Some(resolve_with_base(base, &self.cache_path))
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.default_top_k == 0 {
            return Err(crate::Error::InvalidConfig("library.default_top_k must be at least 1".into()));
        }
        if self.snippet.max_len == 0 {
            return Err(crate::Error::InvalidConfig("library.snippet.max_len must be at least 1".into()));
        }
        if self.scan.max_depth == 0 {
            return Err(crate::Error::InvalidConfig("library.scan.max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Defaults {
    library: LibraryConfig,
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Defaults { library: LibraryConfig::default() }))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            other => tracing::debug!(env = other, "no environment overlay for RUST_ENV"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.library()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn library(&self) -> anyhow::Result<LibraryConfig> {
        self.get("library")
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
