//! Port for the per-workspace index lifecycle (spec.md §4.5).

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::value_objects::{CommitGeneration, Document, Hit, Query};

/// Opaque handle identifying one workspace's open index resources.
/// Infrastructure implementations are free to store whatever they need
/// behind this id (writer, reader, directory handle); application code
/// never reaches into it directly.
pub type HandleId = String;

/// Outcome of a single `search` call.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Ranked hits, already capped to the query's limits.
    pub hits: Vec<Hit>,
    /// Total number of documents that matched before capping.
    pub total_matches: usize,
    /// The commit generation the search ran against.
    pub generation: CommitGeneration,
    /// Set when the query's hard timeout fired before completion.
    pub timed_out: bool,
}

/// Owns per-workspace writer/reader coordination.
#[async_trait]
pub trait IndexServicePort: Send + Sync {
    /// Open (creating if absent) the index for `workspace_root`, returning
    /// a handle id. Idempotent: a second call for the same root returns
    /// the same handle without re-opening resources.
    async fn acquire(&self, workspace_root: &Path) -> Result<HandleId>;

    /// Delete-by-term on `path` then add `doc`. Buffered until commit.
    async fn add_or_update(&self, handle: &HandleId, doc: Document) -> Result<()>;

    /// Delete-by-term on `path`.
    async fn delete(&self, handle: &HandleId, path: &str) -> Result<()>;

    /// Flush buffered documents, advance the commit generation, refresh
    /// the NRT reader.
    async fn commit(&self, handle: &HandleId) -> Result<CommitGeneration>;

    /// Run `query` against the latest reader snapshot.
    async fn search(&self, handle: &HandleId, query: &Query) -> Result<SearchOutcome>;

    /// The commit generation currently visible to new readers.
    async fn current_generation(&self, handle: &HandleId) -> Result<CommitGeneration>;

    /// Flush, commit, and release resources. Idempotent.
    async fn close(&self, handle: &HandleId) -> Result<()>;

    /// Verify segments; rebuild from source if corrupt.
    async fn repair(&self, handle: &HandleId) -> Result<()>;

    /// Remove every document from the index without closing it, so a
    /// force-rebuild can re-add under the same writer.
    async fn clear(&self, handle: &HandleId) -> Result<()>;

    /// Fetch one document's raw content by its canonical path, for
    /// callers (e.g. similar-file comparison) that need the source text
    /// rather than a ranked search result.
    async fn get_content(&self, handle: &HandleId, path: &str) -> Result<Option<String>>;
}
