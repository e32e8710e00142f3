//! `indexHealthCheck` (spec.md §6): a diagnostic sweep over the registry,
//! stale writer locks, and process memory pressure, surfaced as a single
//! report rather than three separate calls.

use super::Engine;
use codesearch_domain::error::Result;
use codesearch_domain::ports::LockReport;
use codesearch_domain::value_objects::WorkspaceStatus;
use codesearch_infrastructure::pressure::MemoryPressure;
use serde::Serialize;

/// Aggregate health of the registry, locks, and process memory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Workspaces currently tracked in the registry.
    pub total_workspaces: usize,
    /// Workspaces whose original path no longer resolves.
    pub missing_workspaces: usize,
    /// Orphaned index directories awaiting their grace period.
    pub orphaned_indexes: usize,
    /// Total documents across every tracked workspace.
    pub total_documents: u64,
    /// Total index bytes on disk across every tracked workspace.
    pub total_index_size_bytes: u64,
    /// Stale lock artifacts found and repaired during this check.
    pub locks_repaired: usize,
    /// Lock artifacts left in place because a holder is still live.
    pub locks_retained: usize,
    /// This process's current resident memory, in bytes.
    pub resident_memory_bytes: u64,
    /// Whether every signal above is within expected bounds.
    pub healthy: bool,
}

impl Engine {
    /// Run a full diagnostic sweep. Does not touch any single workspace's
    /// index handle, so it is safe to call while indexing is in progress.
    ///
    /// # Errors
    ///
    /// Propagates registry or lock-manager failures.
    pub async fn health_check(&self) -> Result<HealthReport> {
        let workspaces = self.registry.list().await?;
        let orphans = self.registry.list_orphans().await?;
        let lock_reports = self.lock_manager.scan_and_repair().await?;

        let missing_workspaces = workspaces.iter().filter(|w| w.status == WorkspaceStatus::Missing).count();
        let total_documents = workspaces.iter().map(|w| w.document_count).sum();
        let total_index_size_bytes = workspaces.iter().map(|w| w.index_size_bytes).sum();

        let locks_repaired = lock_reports.iter().filter(|r: &&LockReport| r.removed).count();
        let locks_retained = lock_reports.iter().filter(|r: &&LockReport| !r.removed).count();

        let resident_memory_bytes = MemoryPressure::new().resident_bytes();
        let healthy = missing_workspaces == 0;

        Ok(HealthReport {
            total_workspaces: workspaces.len(),
            missing_workspaces,
            orphaned_indexes: orphans.len(),
            total_documents,
            total_index_size_bytes,
            locks_repaired,
            locks_retained,
            resident_memory_bytes,
            healthy,
        })
    }
}
