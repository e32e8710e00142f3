//! `indexWorkspace` (spec.md §6): full or incremental reindex of one
//! workspace, from a cold walk through commit.

use super::{now_secs, Engine};
use codesearch_domain::error::Result;
use codesearch_infrastructure::indexer::{FileIndexer, IndexerConfig};
use serde::Serialize;
use std::path::Path;

/// Outcome of one `indexWorkspace` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexWorkspaceOutcome {
    /// The workspace's content-addressed hash.
    pub workspace_hash: String,
    /// Files successfully indexed.
    pub files_indexed: u64,
    /// Files skipped by a filter.
    pub files_skipped: u64,
    /// Files that failed to read.
    pub files_failed: u64,
    /// The commit generation after this index run.
    pub commit_generation: u64,
}

impl Engine {
    /// Walk `workspace_path`, index every eligible file, and commit.
    /// Idempotent: re-running against an unchanged tree produces the same
    /// documents (delete-then-add per path keeps the index consistent).
    ///
    /// # Errors
    ///
    /// Propagates registry, indexer, or index-service failures.
    pub async fn index_workspace(&self, workspace_path: &str, indexer_config: IndexerConfig) -> Result<IndexWorkspaceOutcome> {
        let workspace = self.registry.get_or_create(workspace_path).await?;
        let handle = self.index_service.acquire(Path::new(workspace_path)).await?;

        let indexer = FileIndexer::new(indexer_config);
        let (documents, stats) = indexer.walk(Path::new(workspace_path))?;

        for document in documents {
            self.index_service.add_or_update(&handle, document).await?;
        }
        let generation = self.index_service.commit(&handle).await?;
        self.cache.clear().await;

        let mut updated = workspace.clone();
        updated.document_count = stats.files_indexed;
        updated.index_size_bytes = stats.bytes_read;
        updated.last_accessed = now_secs();
        self.registry.update(updated).await?;

        Ok(IndexWorkspaceOutcome {
            workspace_hash: workspace.hash,
            files_indexed: stats.files_indexed,
            files_skipped: stats.files_skipped,
            files_failed: stats.files_failed,
            commit_generation: generation.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::Engine;
    use codesearch_infrastructure::cache::LruQueryCache;
    use codesearch_infrastructure::index::TantivyIndexService;
    use codesearch_infrastructure::lock::FsLockManager;
    use codesearch_infrastructure::path::PathResolver;
    use codesearch_infrastructure::registry::JsonWorkspaceRegistry;
    use std::fs;
    use std::sync::Arc;

    #[tokio::test]
    async fn indexes_workspace_and_updates_registry() {
        let base = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        fs::write(workspace.path().join("a.rs"), "fn main() {}").unwrap();

        let resolver = PathResolver::new(base.path().to_path_buf());
        let engine = Engine::new(
            Arc::new(TantivyIndexService::new(resolver.clone())),
            Arc::new(JsonWorkspaceRegistry::open(resolver.clone()).unwrap()),
            Arc::new(LruQueryCache::new(16)),
            Arc::new(FsLockManager::new(resolver)),
        );

        let outcome =
            engine.index_workspace(workspace.path().to_str().unwrap(), IndexerConfig::default()).await.unwrap();
        assert_eq!(outcome.files_indexed, 1);
        assert_eq!(outcome.commit_generation, 1);

        let registered = engine.registry.list().await.unwrap();
        assert_eq!(registered[0].document_count, 1);
    }
}
