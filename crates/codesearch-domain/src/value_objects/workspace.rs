//! The `Workspace` entity (spec.md §3) and its index-handle state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a registered workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkspaceStatus {
    /// Indexed and reachable on disk.
    Active,
    /// The original path no longer exists.
    Missing,
    /// The index failed to open or repair.
    Error,
    /// Kept for history but not actively watched.
    Archived,
}

/// A directory tree indexed as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Content-addressed hash, also the index directory suffix.
    pub hash: String,
    /// The original, uncanonicalized path the caller supplied.
    pub original_path: String,
    /// `<basename>_<hash>`, the directory name under `<base>/indexes/`.
    pub directory_name: String,
    /// Human-friendly name for display.
    pub display_name: String,
    /// Current lifecycle status.
    pub status: WorkspaceStatus,
    /// Unix timestamp (seconds) the workspace was first indexed.
    pub created_at: u64,
    /// Unix timestamp (seconds) of the most recent access.
    pub last_accessed: u64,
    /// Number of documents currently stored in the index.
    pub document_count: u64,
    /// On-disk size of the index directory in bytes.
    pub index_size_bytes: u64,
    /// Process or host id currently holding the writer, if any.
    pub locked_by: Option<String>,
}

/// The states an [`IndexHandle`](crate::value_objects::IndexHandleState)
/// may occupy, per the `IndexService` state machine in spec.md §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHandleState {
    /// No resources held.
    Closed,
    /// Directory/writer/reader are being created.
    Opening,
    /// Usable for reads and writes.
    Ready,
    /// A write batch is in progress.
    Indexing,
    /// Segment verification/rebuild underway.
    Repairing,
    /// Resources are being released.
    Closing,
    /// Opening or repair failed; only `Closing`/`Opening` are valid next.
    Failed,
}

impl IndexHandleState {
    /// Whether `next` is a legal transition from `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use IndexHandleState::{Closed, Closing, Failed, Indexing, Opening, Ready, Repairing};
        matches!(
            (self, next),
            (Closed, Opening)
                | (Opening, Ready)
                | (Opening, Failed)
                | (Ready, Indexing)
                | (Indexing, Ready)
                | (Indexing, Failed)
                | (Ready, Repairing)
                | (Repairing, Ready)
                | (Repairing, Failed)
                | (Ready, Closing)
                | (Failed, Closing)
                | (Failed, Opening)
                | (Closing, Closed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::IndexHandleState::{Closed, Closing, Failed, Indexing, Opening, Ready, Repairing};

    #[test]
    fn ready_cannot_jump_straight_to_closed() {
        assert!(!Ready.can_transition_to(Closed));
    }

    #[test]
    fn failed_only_permits_closing_or_opening() {
        assert!(Failed.can_transition_to(Closing));
        assert!(Failed.can_transition_to(Opening));
        assert!(!Failed.can_transition_to(Ready));
        assert!(!Failed.can_transition_to(Indexing));
        assert!(!Failed.can_transition_to(Repairing));
    }

    #[test]
    fn normal_lifecycle_is_legal() {
        assert!(Closed.can_transition_to(Opening));
        assert!(Opening.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Indexing));
        assert!(Indexing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Closing));
        assert!(Closing.can_transition_to(Closed));
    }
}
