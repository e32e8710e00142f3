//! The request surface (spec.md §6): thin, transport-agnostic functions
//! that call one [`Engine`] use-case and wrap its outcome (or the domain
//! error it returned) in the uniform [`Envelope`].
//!
//! `file_search`, `directory_search`, and `recent_files` all return the
//! same `SearchResponseData` shape as `text_search` rather than three
//! near-identical `FileMatch`/`DirectoryMatch`/`RecentFile` structs: in
//! this engine all three are filtered searches over the same per-field
//! index, and the fields spec.md lists for those three record types
//! (path, size, modified time, match context) are already present on
//! `Hit`/`SearchResponseData`.

use crate::envelope::{Envelope, Metadata};
use codesearch_application::{Engine, HealthReport, IndexWorkspaceOutcome, SearchResponseData, SimilarFile};
use codesearch_domain::error::Error;
use codesearch_domain::value_objects::{Query, QueryFilters, ResponseMode, SearchMode};
use codesearch_infrastructure::indexer::IndexerConfig;
use std::time::Instant;

fn metadata_for(total: usize, returned: usize, truncated: bool, tokens: Option<usize>, started: Instant) -> Metadata {
    Metadata {
        total_count: total,
        returned_count: returned,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        estimated_tokens: tokens,
        truncated,
        detail_request_token: truncated.then(|| returned.to_string()),
    }
}

fn search_metadata(data: &SearchResponseData, started: Instant) -> Metadata {
    metadata_for(data.total_matches, data.hits.len(), data.truncated, Some(data.estimated_tokens), started)
}

/// `index_workspace(workspacePath, forceRebuild?)`. `force_rebuild` is
/// accepted for interface parity: a full walk-and-commit is always
/// idempotent here (`add_or_update` is delete-then-add per path), so
/// there is no separate incremental code path to skip.
pub async fn index_workspace(engine: &Engine, workspace_path: &str, force_rebuild: bool) -> Envelope<IndexWorkspaceOutcome> {
    let started = Instant::now();
    tracing::debug!(force_rebuild, workspace_path, "index_workspace requested");
    match engine.index_workspace(workspace_path, IndexerConfig::default()).await {
        Ok(outcome) => {
            let metadata = metadata_for(outcome.files_indexed as usize, outcome.files_indexed as usize, false, None, started);
            Envelope::ok(outcome, ResponseMode::Summary, metadata)
        }
        Err(error) => Envelope::err(&error, ResponseMode::Summary),
    }
}

/// `text_search(query, workspacePath, mode?, filters?, responseMode?, maxTokens?, noCache?)`.
pub async fn text_search(
    engine: &Engine,
    workspace_path: &str,
    query_text: &str,
    mode: SearchMode,
    filters: QueryFilters,
    response_mode: ResponseMode,
    max_tokens: Option<usize>,
    no_cache: bool,
) -> Envelope<SearchResponseData> {
    let started = Instant::now();
    let mut query = Query::new(query_text, mode);
    query.filters = filters;
    query.response_mode = response_mode;
    query.max_tokens = max_tokens;
    query.no_cache = no_cache;

    match engine.text_search(workspace_path, query).await {
        Ok(data) => {
            let metadata = search_metadata(&data, started);
            Envelope::ok(data, response_mode, metadata)
        }
        Err(error) => Envelope::err(&error, response_mode),
    }
}

/// `file_search(pattern, workspacePath, useRegex?, extensionFilter?, maxResults?)`.
pub async fn file_search(
    engine: &Engine,
    workspace_path: &str,
    pattern: &str,
    extension_filter: Option<Vec<String>>,
    max_results: usize,
) -> Envelope<SearchResponseData> {
    let started = Instant::now();
    match engine.file_search(workspace_path, pattern).await {
        Ok(mut data) => {
            if let Some(extensions) = &extension_filter {
                data.hits.retain(|hit| {
                    std::path::Path::new(&hit.relative_path)
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
                });
            }
            data.hits.truncate(max_results);
            let metadata = search_metadata(&data, started);
            Envelope::ok(data, ResponseMode::Summary, metadata)
        }
        Err(error) => Envelope::err(&error, ResponseMode::Summary),
    }
}

/// `directory_search(pattern, workspacePath, includeSubdirectories?, includeHidden?, maxResults?)`.
pub async fn directory_search(
    engine: &Engine,
    workspace_path: &str,
    directory_glob: &str,
    text: &str,
    max_results: usize,
) -> Envelope<SearchResponseData> {
    let started = Instant::now();
    match engine.directory_search(workspace_path, directory_glob, text).await {
        Ok(mut data) => {
            data.hits.truncate(max_results);
            let metadata = search_metadata(&data, started);
            Envelope::ok(data, ResponseMode::Summary, metadata)
        }
        Err(error) => Envelope::err(&error, ResponseMode::Summary),
    }
}

/// `recent_files(workspacePath, timeFrame, extensionFilter?, maxResults?)`.
pub async fn recent_files(
    engine: &Engine,
    workspace_path: &str,
    since_unix_secs: u64,
    max_results: usize,
) -> Envelope<SearchResponseData> {
    let started = Instant::now();
    match engine.recent_files(workspace_path, since_unix_secs, max_results).await {
        Ok(data) => {
            let metadata = search_metadata(&data, started);
            Envelope::ok(data, ResponseMode::Summary, metadata)
        }
        Err(error) => Envelope::err(&error, ResponseMode::Summary),
    }
}

/// `similar_files(filePath, workspacePath, maxResults?, minScore?)`.
pub async fn similar_files(
    engine: &Engine,
    workspace_path: &str,
    file_path: &str,
    max_results: usize,
    min_score: f32,
) -> Envelope<Vec<SimilarFile>> {
    let started = Instant::now();
    match engine.similar_files(workspace_path, file_path, max_results).await {
        Ok(mut matches) => {
            matches.retain(|m| m.similarity >= min_score);
            let count = matches.len();
            let metadata = metadata_for(count, count, false, None, started);
            Envelope::ok(matches, ResponseMode::Summary, metadata)
        }
        Err(error) => Envelope::err(&error, ResponseMode::Summary),
    }
}

/// `index_health_check(workspacePath?)`. `workspacePath` is accepted for
/// interface parity with spec.md but unused: the health sweep always
/// covers every registered workspace plus process-wide memory pressure.
pub async fn index_health_check(engine: &Engine, _workspace_path: Option<&str>) -> Envelope<HealthReport> {
    let started = Instant::now();
    match engine.health_check().await {
        Ok(report) => {
            let metadata = metadata_for(report.total_workspaces, report.total_workspaces, false, None, started);
            Envelope::ok(report, ResponseMode::Summary, metadata)
        }
        Err(error) => Envelope::err(&error, ResponseMode::Summary),
    }
}

/// One operation within a `batch_operations` call.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BatchOperation {
    /// A `text_search` call.
    TextSearch {
        /// Workspace to search, falling back to the batch default.
        workspace_path: Option<String>,
        /// Raw query text.
        query: String,
        /// Search mode.
        #[serde(default = "default_search_mode")]
        mode: SearchMode,
    },
    /// A `recent_files` call.
    RecentFiles {
        /// Workspace to search, falling back to the batch default.
        workspace_path: Option<String>,
        /// Unix timestamp lower bound.
        since_unix_secs: u64,
        /// Result cap.
        #[serde(default = "default_batch_limit")]
        max_results: usize,
    },
}

fn default_batch_limit() -> usize {
    codesearch_domain::constants::DEFAULT_TOTAL_RESULT_CAP
}

fn default_search_mode() -> SearchMode {
    SearchMode::Auto
}

/// One operation's outcome within a batch response.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Index of the operation within the request array.
    pub index: usize,
    /// The operation's own envelope, or an envelope carrying a
    /// [`Error::Timeout`] if it exceeded its per-operation budget.
    pub envelope: serde_json::Value,
}

/// `batch_operations(operations[], defaultWorkspacePath?)`: runs every
/// operation concurrently, each under its own timeout, and aggregates the
/// per-operation envelopes without letting one slow or failing operation
/// block the rest.
pub async fn batch_operations(
    engine: &Engine,
    operations: Vec<BatchOperation>,
    default_workspace_path: Option<String>,
) -> Vec<BatchResult> {
    let per_op_timeout = std::time::Duration::from_secs(codesearch_domain::constants::DEFAULT_QUERY_TIMEOUT_SECS);

    let futures = operations.into_iter().enumerate().map(|(index, operation)| {
        let default_workspace_path = default_workspace_path.clone();
        async move {
            let workspace_path = match &operation {
                BatchOperation::TextSearch { workspace_path, .. } => workspace_path.clone(),
                BatchOperation::RecentFiles { workspace_path, .. } => workspace_path.clone(),
            }
            .or(default_workspace_path);

            let Some(workspace_path) = workspace_path else {
                let error = Error::InvalidPath { path: String::new(), reason: "no workspacePath supplied and no default set".to_owned() };
                let envelope = Envelope::<()>::err(&error, ResponseMode::Summary);
                return BatchResult { index, envelope: serde_json::to_value(envelope).unwrap_or_default() };
            };

            let value = match tokio::time::timeout(per_op_timeout, run_batch_operation(engine, &workspace_path, operation)).await
            {
                Ok(value) => value,
                Err(_) => {
                    let error = Error::Timeout { elapsed_ms: per_op_timeout.as_millis() as u64 };
                    serde_json::to_value(Envelope::<()>::err(&error, ResponseMode::Summary)).unwrap_or_default()
                }
            };
            BatchResult { index, envelope: value }
        }
    });

    futures::future::join_all(futures).await
}

async fn run_batch_operation(engine: &Engine, workspace_path: &str, operation: BatchOperation) -> serde_json::Value {
    match operation {
        BatchOperation::TextSearch { query, mode, .. } => {
            let envelope = text_search(
                engine,
                workspace_path,
                &query,
                mode,
                QueryFilters::default(),
                ResponseMode::Adaptive,
                None,
                false,
            )
            .await;
            serde_json::to_value(envelope).unwrap_or_default()
        }
        BatchOperation::RecentFiles { since_unix_secs, max_results, .. } => {
            let envelope = recent_files(engine, workspace_path, since_unix_secs, max_results).await;
            serde_json::to_value(envelope).unwrap_or_default()
        }
    }
}
