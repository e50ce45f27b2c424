use std::env;
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use doclib_core::config::Config;
use doclib_core::traits::DocumentStore;
use doclib_text::{DocumentLibrary, LoadSource};

const DEFAULT_LOG_FILTER: &str = "info";

const USAGE: &str = "Usage: doclib [list | refresh | search <query> [--top-k N] | show <name> | docs [args...]]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum DocsCommand {
    List,
    Refresh,
    Search { query: String, top_k: Option<usize> },
    Show(String),
}

/// Parse the argument string of a `/docs` command.
///
/// Empty lists the library, `refresh` rebuilds, `search <q>` searches and
/// anything else is taken as a document name.
fn parse_docs(args: &str) -> Result<DocsCommand, String> {
    let args = args.trim();
    if args.is_empty() {
        return Ok(DocsCommand::List);
    }
    if args.eq_ignore_ascii_case("refresh") {
        return Ok(DocsCommand::Refresh);
    }
    let is_search = args.eq_ignore_ascii_case("search")
        || args.get(..7).is_some_and(|head| head.eq_ignore_ascii_case("search "));
    if is_search {
        let query = args.get(7..).unwrap_or_default().trim();
        if query.is_empty() {
            return Err("Usage: docs search <query>".to_string());
        }
        return Ok(DocsCommand::Search { query: query.to_string(), top_k: None });
    }
    Ok(DocsCommand::Show(args.to_string()))
}

fn parse_command(args: &[String]) -> Result<DocsCommand, String> {
    let Some((cmd, rest)) = args.split_first() else {
        return Ok(DocsCommand::List);
    };
    match cmd.as_str() {
        "list" if rest.is_empty() => Ok(DocsCommand::List),
        "refresh" if rest.is_empty() => Ok(DocsCommand::Refresh),
        "search" => parse_search(rest),
        "show" if !rest.is_empty() => Ok(DocsCommand::Show(rest.join(" "))),
        "docs" => parse_docs(&rest.join(" ")),
        "-h" | "--help" | "help" => Err(USAGE.to_string()),
        other => Err(format!("Unknown command: {other}\n{USAGE}")),
    }
}

fn parse_search(args: &[String]) -> Result<DocsCommand, String> {
    let mut words = Vec::new();
    let mut top_k = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--top-k" | "-k" => {
                let value = args.get(i + 1).ok_or("--top-k requires a number")?;
                let parsed = value.parse::<usize>().map_err(|_| format!("--top-k requires a number, got '{value}'"))?;
                top_k = Some(parsed);
                i += 1;
            }
            word => words.push(word),
        }
        i += 1;
    }
    let query = words.join(" ");
    if query.trim().is_empty() {
        return Err("Usage: doclib search <query> [--top-k N]".to_string());
    }
    Ok(DocsCommand::Search { query, top_k })
}

/// `RUST_LOG` directives when present and valid, else [`DEFAULT_LOG_FILTER`].
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn spinner(message: &'static str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn run(command: DocsCommand, library: &mut DocumentLibrary) -> anyhow::Result<ExitCode> {
    if command != DocsCommand::Refresh && !library.is_ready() {
        let pb = spinner("Loading document index...")?;
        let source = library.initialize();
        pb.finish_and_clear();
        if source == LoadSource::Built {
            println!("Indexed {} documents from {}", library.list_documents().len(), library.corpus_root().display());
        }
    }

    match command {
        DocsCommand::List => {
            let docs = library.list_documents();
            if docs.is_empty() {
                println!("No documents found in {}", library.corpus_root().display());
                return Ok(ExitCode::SUCCESS);
            }
            println!("📚 Document library ({} documents)", docs.len());
            for doc in &docs {
                println!("  {:<40} {:<8} {}", doc.name, doc.doc_type.as_str(), doc.title);
            }
        }
        DocsCommand::Refresh => {
            let pb = spinner("Rebuilding document index...")?;
            let count = library.refresh();
            pb.finish_and_clear();
            println!("✅ Indexed {count} documents");
            if let Some(report) = library.last_build() {
                if !report.root_found {
                    println!("⚠️  Library directory not found: {}", report.root.display());
                }
                if report.placeholders > 0 {
                    println!("⚠️  {} documents listed without their text (no decoder)", report.placeholders);
                }
                for skipped in &report.skipped {
                    println!("⚠️  Skipped {}: {}", skipped.path.display(), skipped.reason);
                }
            }
        }
        DocsCommand::Search { query, top_k } => {
            let top_k = top_k.unwrap_or_else(|| library.default_top_k());
            let results = library.search(&query, top_k);
            if results.is_empty() {
                println!("No results for \"{query}\"");
                return Ok(ExitCode::SUCCESS);
            }
            println!("🔍 Found {} results for: \"{}\"", results.len(), query);
            for (i, result) in results.iter().enumerate() {
                println!("\n  {}. {}  ({})  score={:.4}", i + 1, result.title, result.name, result.score);
                println!("     {}", result.snippet);
            }
        }
        DocsCommand::Show(name) => match library.get_document(&name) {
            Some(content) => println!("{content}"),
            None => {
                eprintln!("Document not found: {name}");
                eprintln!("Use 'doclib list' to list available documents");
                return Ok(ExitCode::FAILURE);
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let mut library = DocumentLibrary::from_config(&config.library()?, &env::current_dir()?);
    tracing::debug!(root = %library.corpus_root().display(), ?command, "running");
    run(command, &mut library)
}
