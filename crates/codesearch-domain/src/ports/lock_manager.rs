//! Port for stale writer-lock detection and repair (spec.md §4.3).

use async_trait::async_trait;

use crate::error::Result;

/// Classification bucket for a discovered lock artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockClassification {
    /// Very young, name matches a known test-fixture pattern.
    TestFixture,
    /// Owned by a workspace whose holder could not be proven dead, but
    /// below the stale threshold.
    WorkspaceOwned,
    /// At or past the stale threshold with no live holder recorded.
    Suspicious,
}

/// A single lock artifact observed on disk.
#[derive(Debug, Clone)]
pub struct LockReport {
    /// Workspace directory name the lock belongs to.
    pub directory_name: String,
    /// Age of the lock file.
    pub age_secs: u64,
    /// Classification bucket.
    pub classification: LockClassification,
    /// Whether this lock was deleted during this pass.
    pub removed: bool,
}

/// Detects and repairs stale writer locks.
#[async_trait]
pub trait LockManagerPort: Send + Sync {
    /// Enumerate every index directory's lock artifact and classify it,
    /// deleting any that are `Suspicious` and whose holder is not proven
    /// live. Never deletes a lock with a registered live holder.
    async fn scan_and_repair(&self) -> Result<Vec<LockReport>>;
}
