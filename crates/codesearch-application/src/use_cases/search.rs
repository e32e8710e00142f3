//! `textSearch`, `fileSearch`, `directorySearch`, and `recentFiles`
//! (spec.md §6): each constructs a [`Query`] for its shape of request and
//! shares the cache-aware execution path.

use super::Engine;
use crate::response::{ResponseBuilder, SearchResponseData};
use codesearch_domain::error::Result;
use codesearch_domain::ports::CachedValue;
use codesearch_domain::value_objects::{Query, SearchMode};
use std::path::Path;

impl Engine {
    /// Free-text search against an already-indexed workspace.
    ///
    /// # Errors
    ///
    /// Propagates index-service or cache failures.
    pub async fn text_search(&self, workspace_path: &str, query: Query) -> Result<SearchResponseData> {
        self.run_query(workspace_path, query).await
    }

    /// Search for files whose name matches `filename_glob`.
    ///
    /// # Errors
    ///
    /// Propagates index-service or cache failures.
    pub async fn file_search(&self, workspace_path: &str, filename_glob: &str) -> Result<SearchResponseData> {
        let mut query = Query::new("*", SearchMode::Standard);
        query.filters.include_globs = Some(vec![format!("**/{filename_glob}")]);
        self.run_query(workspace_path, query).await
    }

    /// Search for `text` within files under `directory_glob`.
    ///
    /// # Errors
    ///
    /// Propagates index-service or cache failures.
    pub async fn directory_search(
        &self,
        workspace_path: &str,
        directory_glob: &str,
        text: &str,
    ) -> Result<SearchResponseData> {
        let mut query = Query::new(text, SearchMode::Auto);
        query.filters.include_globs = Some(vec![format!("{directory_glob}/**")]);
        self.run_query(workspace_path, query).await
    }

    /// Files modified at or after `since_unix_secs`, most recent first is
    /// left to the caller (ranking here is relevance, not recency; callers
    /// wanting strict recency order should sort `hits` by `modified_since`
    /// filter boundary themselves).
    ///
    /// # Errors
    ///
    /// Propagates index-service or cache failures.
    pub async fn recent_files(&self, workspace_path: &str, since_unix_secs: u64, limit: usize) -> Result<SearchResponseData> {
        let mut query = Query::new("*", SearchMode::Standard);
        query.filters.modified_since = Some(since_unix_secs);
        query.limit = limit;
        self.run_query(workspace_path, query).await
    }

    async fn run_query(&self, workspace_path: &str, query: Query) -> Result<SearchResponseData> {
        let handle = self.index_service.acquire(Path::new(workspace_path)).await?;
        let generation = self.index_service.current_generation(&handle).await?;
        let cache_key = query.fingerprint_source();

        if !query.no_cache {
            if let Some(cached) = self.cache.get(&cache_key, generation).await {
                if let Ok(data) = serde_json::from_value(cached) {
                    return Ok(data);
                }
            }
        }

        let outcome = self.index_service.search(&handle, &query).await?;
        let data = ResponseBuilder::build(&query, outcome.hits, outcome.total_matches);

        if !query.no_cache {
            if let Ok(payload) = serde_json::to_value(&data) {
                self.cache.put(cache_key, CachedValue { payload, generation: outcome.generation }).await;
            }
        }

        Ok(data)
    }
}
