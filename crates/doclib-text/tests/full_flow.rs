use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use doclib_core::config::{LibraryConfig, ScanConfig, SnippetConfig};
use doclib_core::scanner::CorpusScanner;
use doclib_core::tokenize::tokenize;
use doclib_core::traits::DocumentStore;
use doclib_core::types::DocType;
use doclib_text::{CacheLoad, DocumentLibrary, LibraryState, LoadSource};

fn temp_library() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("docs/library");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("test_commands.md"),
        "# Test Commands Reference\n\n## 1. Claude CLI\n- `claude` starts an interactive session\n- `claude -p` prints a response\n\n## 2. Gemini CLI\n- `gemini` opens the research workflow\n",
    )
    .unwrap();
    fs::write(
        root.join("workflow_strategy.md"),
        "# Workflow Strategy\n\nResearch first, then build. Hand off research notes to the builder.\n",
    )
    .unwrap();
    fs::write(root.join("report.md"), "# Report\n\nQuarterly revenue grew in every region.\n").unwrap();
    (tmp, root)
}

fn cache_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("config/knowledge_index.json")
}

#[test]
fn report_scenario_lists_title_and_finds_exclusive_term() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);

    let docs = library.list_documents();
    let report = docs.iter().find(|d| d.name == "report.md").unwrap();
    assert_eq!(report.title, "Report");
    assert_eq!(report.doc_type, DocType::Markdown);

    let results = library.search("revenue", 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "report.md");
    assert_eq!(results[0].title, "Report");
    assert!(results[0].score > 0.0);
    assert!(results[0].snippet.to_lowercase().contains("revenue"));
}

#[test]
fn nonexistent_root_scenario() {
    let tmp = TempDir::new().unwrap();
    let mut library = DocumentLibrary::new(tmp.path().join("nonexistent"));
    assert_eq!(library.build(false), 0);
    assert!(library.search("anything", 5).is_empty());
    assert!(library.search("", 5).is_empty());
    assert_eq!(library.get_document("anything"), None);
    assert!(library.list_documents().is_empty());
    assert!(!library.last_build().unwrap().root_found);
}

#[test]
fn search_respects_top_k_and_only_returns_overlapping_documents() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);

    let query = "research builder session";
    let query_terms = tokenize(query);
    let results = library.search(query, 5);
    assert!(!results.is_empty());
    for result in &results {
        let content = library.get_document(&result.name).unwrap();
        let doc_terms = tokenize(&content);
        assert!(query_terms.keys().any(|t| doc_terms.contains_key(t)), "{} shares no term with the query", result.name);
        assert!(result.score > 0.0);
    }
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score), "descending score order");

    assert!(library.search(query, 1).len() <= 1);
    assert!(library.search(query, 0).is_empty());
}

#[test]
fn higher_term_frequency_ranks_first() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);
    let results = library.search("research", 5);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "workflow_strategy.md", "two mentions beat one");
    assert_eq!(results[1].name, "test_commands.md");
}

#[test]
fn unmatched_query_returns_nothing() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);
    assert!(library.search("xyznonexistent123", 5).is_empty());
}

#[test]
fn stop_word_query_falls_back_to_substring_search() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);

    assert!(library.search("the a an", 5).is_empty());

    let results = library.search("-P", 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "test_commands.md");
    assert_eq!(results[0].score, 1.0);
    assert!(results[0].snippet.contains("-p"));

    let results = library.search("# ", 2);
    assert_eq!(results.len(), 2, "substring mode truncates to top_k");
    assert!(results.iter().all(|r| r.score == 1.0));
}

#[test]
fn get_document_lookup_order() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);

    let exact = library.get_document("test_commands.md").unwrap();
    assert!(exact.contains("Claude CLI"));
    assert_eq!(library.get_document("TEST_COMMANDS.MD").unwrap(), exact);
    assert_eq!(library.get_document("Commands").unwrap(), exact);
    assert!(library.get_document("strategy").unwrap().contains("Workflow Strategy"));
    assert_eq!(library.get_document("nonexistent.md"), None);
}

#[test]
fn first_use_builds_then_second_library_loads_cache() {
    let (tmp, root) = temp_library();
    let cache = cache_path(&tmp);

    let mut first = DocumentLibrary::new(&root).with_cache(&cache);
    assert_eq!(first.state(), &LibraryState::Uninitialized);
    assert_eq!(first.initialize(), LoadSource::Built);
    assert_eq!(first.initialize(), LoadSource::AlreadyReady);
    assert!(first.last_build().unwrap().cache_saved);
    assert!(cache.exists());

    let mut second = DocumentLibrary::new(&root).with_cache(&cache);
    assert_eq!(second.initialize(), LoadSource::Cache);
    assert!(second.last_build().is_none(), "a cache hit does not scan");
    assert_eq!(second.list_documents(), first.list_documents());
    assert_eq!(second.search("revenue", 5), first.search("revenue", 5));
}

#[test]
fn corrupt_cache_degrades_to_rebuild() {
    let (tmp, root) = temp_library();
    let cache = cache_path(&tmp);
    fs::create_dir_all(cache.parent().unwrap()).unwrap();
    fs::write(&cache, "garbage").unwrap();

    let mut library = DocumentLibrary::new(&root).with_cache(&cache);
    assert_eq!(library.initialize(), LoadSource::Built);
    assert_eq!(library.list_documents().len(), 3);
    assert!(matches!(library.cache().unwrap().load(), CacheLoad::Loaded(_)), "rebuild rewrote the cache");
}

#[test]
fn refresh_bypasses_a_stale_cache() {
    let (tmp, root) = temp_library();
    let cache = cache_path(&tmp);
    DocumentLibrary::new(&root).with_cache(&cache).initialize();

    fs::write(root.join("glossary.md"), "# Glossary\n\nIdempotent: safe to repeat.\n").unwrap();

    let mut library = DocumentLibrary::new(&root).with_cache(&cache);
    assert_eq!(library.list_documents().len(), 3, "stale cache is served until refresh");
    assert_eq!(library.refresh(), 4);
    assert!(library.get_document("glossary").unwrap().contains("Idempotent"));
}

#[test]
fn build_rescans_even_when_ready() {
    let (tmp, root) = temp_library();
    let cache = cache_path(&tmp);
    let mut library = DocumentLibrary::new(&root).with_cache(&cache);
    assert_eq!(library.build(false), 3);
    assert!(library.is_ready());

    fs::write(root.join("glossary.md"), "# Glossary\n\nIdempotent: safe to repeat.\n").unwrap();
    assert_eq!(library.build(false), 4, "a ready index does not short-circuit build");
    assert!(library.get_document("glossary.md").is_some());

    fs::remove_file(root.join("report.md")).unwrap();
    assert_eq!(library.build(false), 3, "previous entries are cleared");
    assert_eq!(library.get_document("report.md"), None);
    assert!(matches!(library.cache().unwrap().load(), CacheLoad::Loaded(index) if index.len() == 3));
}

#[test]
fn empty_query_matches_every_document_in_corpus_order() {
    let (_tmp, root) = temp_library();
    let mut library = DocumentLibrary::new(&root);

    let results = library.search("", 5);
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["report.md", "test_commands.md", "workflow_strategy.md"]);
    assert!(results.iter().all(|r| r.score == 1.0));
    assert!(results[0].snippet.starts_with("# Report"));

    assert_eq!(library.search("", 2).len(), 2);
    assert_eq!(library.search("   ", 5).len(), 0, "whitespace is searched literally");
}

#[test]
fn placeholder_documents_are_listed_but_not_searchable() {
    let (_tmp, root) = temp_library();
    fs::write(root.join("budget.docx"), b"opaque").unwrap();

    let mut library = DocumentLibrary::new(&root).with_scanner(CorpusScanner::new().with_decoder(None));
    let docs = library.list_documents();
    let budget = docs.iter().find(|d| d.name == "budget.docx").unwrap();
    assert_eq!(budget.doc_type, DocType::Docx);
    assert_eq!(budget.title, "budget");
    assert_eq!(library.last_build().unwrap().placeholders, 1);
    assert!(library.search("budget", 5).iter().all(|r| r.name != "budget.docx"));
    assert!(library.get_document("budget.docx").unwrap().contains("budget.docx"));
}

#[test]
fn from_config_resolves_paths_against_base() {
    let (tmp, _root) = temp_library();
    let config = LibraryConfig {
        corpus_root: "docs/library".into(),
        cache_path: "state/index.json".into(),
        default_top_k: 2,
        snippet: SnippetConfig { max_len: 40, lead: 10 },
        scan: ScanConfig::default(),
    };
    let mut library = DocumentLibrary::from_config(&config, tmp.path());
    assert_eq!(library.corpus_root(), tmp.path().join("docs/library"));
    assert_eq!(library.cache().unwrap().path(), tmp.path().join("state/index.json"));
    assert_eq!(library.default_top_k(), 2);

    let top_k = library.default_top_k();
    let results = library.search("quarterly revenue", top_k);
    assert_eq!(results.len(), 1);
    let body = results[0].snippet.trim_start_matches("...").trim_end_matches("...");
    assert!(body.chars().count() <= 40);
    assert!(Path::new(&tmp.path().join("state/index.json")).exists());
}
