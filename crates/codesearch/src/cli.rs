//! Clap CLI surface: one subcommand per spec.md §6 operation, each
//! translating its flags into a call on [`codesearch_server::api`] and
//! printing the resulting envelope as JSON.

use clap::{Parser, Subcommand};
use codesearch_application::Engine;
use codesearch_domain::value_objects::{QueryFilters, ResponseMode, SearchMode};
use codesearch_server::api;
use std::path::PathBuf;

/// Code-aware, incrementally maintained full-text search over source-code workspaces.
#[derive(Debug, Parser)]
#[command(name = "codesearch", version)]
pub struct Cli {
    /// Override the base directory holding indexes, logs, and the registry.
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Walk a workspace, index every eligible file, and commit.
    Index {
        /// Path to the workspace root.
        workspace_path: String,
        /// Re-walk and re-add every file even if already indexed.
        #[arg(long)]
        force_rebuild: bool,
    },
    /// Free-text search against an indexed workspace.
    Search {
        /// Path to the workspace root.
        workspace_path: String,
        /// Query text.
        query: String,
        /// Search mode: auto, standard, literal, code, symbol, fuzzy, regex.
        #[arg(long, default_value = "auto")]
        mode: String,
        /// Restrict to these file extensions (comma-separated, no dot).
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,
        /// Response shaping: summary, full, adaptive.
        #[arg(long, default_value = "adaptive")]
        response_mode: String,
        /// Soft token budget for the response.
        #[arg(long)]
        max_tokens: Option<usize>,
        /// Bypass the query cache.
        #[arg(long)]
        no_cache: bool,
    },
    /// Search for files whose name matches a glob.
    FileSearch {
        /// Path to the workspace root.
        workspace_path: String,
        /// Filename glob, e.g. `*.rs`.
        pattern: String,
        /// Restrict to these file extensions (comma-separated, no dot).
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,
        /// Maximum results to return.
        #[arg(long, default_value_t = 100)]
        max_results: usize,
    },
    /// Search for text within files under a directory glob.
    DirSearch {
        /// Path to the workspace root.
        workspace_path: String,
        /// Directory glob, e.g. `src/**`.
        directory_glob: String,
        /// Query text to search for within matching directories.
        text: String,
        /// Maximum results to return.
        #[arg(long, default_value_t = 100)]
        max_results: usize,
    },
    /// Files modified at or after a Unix timestamp.
    Recent {
        /// Path to the workspace root.
        workspace_path: String,
        /// Unix timestamp (seconds); only files modified at or after this are returned.
        since_unix_secs: u64,
        /// Maximum results to return.
        #[arg(long, default_value_t = 100)]
        max_results: usize,
    },
    /// Files whose code-identifier vocabulary overlaps with a reference file.
    Similar {
        /// Path to the workspace root.
        workspace_path: String,
        /// Reference file, relative to the workspace root.
        file_path: String,
        /// Maximum results to return.
        #[arg(long, default_value_t = 10)]
        max_results: usize,
        /// Minimum Jaccard similarity score to include.
        #[arg(long, default_value_t = 0.0)]
        min_score: f32,
    },
    /// Diagnostic sweep over the registry, stale locks, and memory pressure.
    Health {
        /// Workspace to focus on; accepted for interface parity, the sweep
        /// always covers every registered workspace.
        workspace_path: Option<String>,
    },
    /// Scan every index directory's lock artifact and repair stale ones.
    /// Implemented as the lock-scanning half of the health sweep.
    CleanupLocks,
}

/// Parse `mode` into a [`SearchMode`], rejecting anything else as a usage error.
fn parse_search_mode(mode: &str) -> Result<SearchMode, String> {
    match mode.to_ascii_lowercase().as_str() {
        "auto" => Ok(SearchMode::Auto),
        "standard" => Ok(SearchMode::Standard),
        "literal" => Ok(SearchMode::Literal),
        "code" => Ok(SearchMode::Code),
        "symbol" => Ok(SearchMode::Symbol),
        "fuzzy" => Ok(SearchMode::Fuzzy),
        "regex" => Ok(SearchMode::Regex),
        other => Err(format!("invalid mode '{other}': expected one of auto, standard, literal, code, symbol, fuzzy, regex")),
    }
}

/// Parse `mode` into a [`ResponseMode`], rejecting anything else as a usage error.
fn parse_response_mode(mode: &str) -> Result<ResponseMode, String> {
    match mode.to_ascii_lowercase().as_str() {
        "summary" => Ok(ResponseMode::Summary),
        "full" => Ok(ResponseMode::Full),
        "adaptive" => Ok(ResponseMode::Adaptive),
        other => Err(format!("invalid responseMode '{other}': expected one of summary, full, adaptive")),
    }
}

/// Run `command` against `engine`, returning the envelope serialized to
/// JSON, or an error string for a usage problem caught before any engine
/// call (unknown mode, etc.) — the caller maps that to exit code 2.
pub async fn dispatch(engine: &Engine, command: Commands) -> Result<serde_json::Value, String> {
    let envelope = match command {
        Commands::Index { workspace_path, force_rebuild } => {
            serde_json::to_value(api::index_workspace(engine, &workspace_path, force_rebuild).await)
        }
        Commands::Search { workspace_path, query, mode, extensions, response_mode, max_tokens, no_cache } => {
            let mode = parse_search_mode(&mode)?;
            let response_mode = parse_response_mode(&response_mode)?;
            let filters = QueryFilters { extensions, ..QueryFilters::default() };
            serde_json::to_value(
                api::text_search(engine, &workspace_path, &query, mode, filters, response_mode, max_tokens, no_cache).await,
            )
        }
        Commands::FileSearch { workspace_path, pattern, extensions, max_results } => {
            serde_json::to_value(api::file_search(engine, &workspace_path, &pattern, extensions, max_results).await)
        }
        Commands::DirSearch { workspace_path, directory_glob, text, max_results } => {
            serde_json::to_value(api::directory_search(engine, &workspace_path, &directory_glob, &text, max_results).await)
        }
        Commands::Recent { workspace_path, since_unix_secs, max_results } => {
            serde_json::to_value(api::recent_files(engine, &workspace_path, since_unix_secs, max_results).await)
        }
        Commands::Similar { workspace_path, file_path, max_results, min_score } => {
            serde_json::to_value(api::similar_files(engine, &workspace_path, &file_path, max_results, min_score).await)
        }
        Commands::Health { workspace_path } => {
            serde_json::to_value(api::index_health_check(engine, workspace_path.as_deref()).await)
        }
        Commands::CleanupLocks => serde_json::to_value(api::index_health_check(engine, None).await),
    };
    envelope.map_err(|error| format!("failed to serialize response: {error}"))
}
