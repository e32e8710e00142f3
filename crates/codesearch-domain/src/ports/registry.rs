//! Port for the persistent workspace catalog (spec.md §4.2).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{OrphanedIndex, Workspace};

/// Outcome of a reconciliation scan.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Orphan candidates newly classified this scan.
    pub new_orphans: usize,
    /// Workspaces whose status changed (e.g. to `Missing`).
    pub status_changes: usize,
    /// Orphans whose grace period elapsed and were reaped.
    pub reaped: usize,
}

/// Persistent, process-wide catalog of known workspaces and orphans.
#[async_trait]
pub trait WorkspaceRegistryPort: Send + Sync {
    /// Return the entry for `original_path`, creating it on first sight.
    async fn get_or_create(&self, original_path: &str) -> Result<Workspace>;

    /// All known (non-orphaned) workspace entries.
    async fn list(&self) -> Result<Vec<Workspace>>;

    /// All orphan candidates.
    async fn list_orphans(&self) -> Result<Vec<OrphanedIndex>>;

    /// Atomically replace a single workspace entry.
    async fn update(&self, entry: Workspace) -> Result<()>;

    /// Remove a workspace entry entirely (explicit removal, not reaping).
    async fn remove(&self, hash: &str) -> Result<()>;

    /// Walk the index root, compare to entries, classify orphans and
    /// reap any whose grace period has elapsed.
    async fn scan_and_reconcile(&self) -> Result<ReconcileReport>;

    /// One-shot: fold any legacy per-index metadata files into the
    /// registry, preserving status where resolvable.
    async fn migrate_from_legacy(&self) -> Result<usize>;
}
