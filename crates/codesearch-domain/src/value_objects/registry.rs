//! Registry persistence types (spec.md §3 Registry/OrphanedIndex, §6
//! `registry.json`). Grounded on the COA-inspired workspace registry
//! (content-addressed `<name>_<hash>` ids, orphan classification with a
//! scheduled-deletion grace period).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::workspace::Workspace;

/// Why an on-disk index directory has no resolvable registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrphanReason {
    /// No registry entry references this directory at all.
    NoMetadata,
    /// A legacy per-index metadata file existed but failed to parse.
    CorruptedMetadata,
    /// The registry entry's original path no longer exists.
    PathNotFound,
    /// The directory name cannot be mapped back to any known path.
    Unresolvable,
    /// An operator explicitly marked this index for removal.
    ManuallyMarked,
}

/// An on-disk index with no valid corresponding workspace entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedIndex {
    /// Directory name under `<base>/indexes/`.
    pub directory_name: String,
    /// Unix timestamp the orphan was first observed.
    pub discovered_at: u64,
    /// Unix timestamp of the directory's most recent modification.
    pub last_modified: u64,
    /// Why it is considered orphaned.
    pub reason: OrphanReason,
    /// Unix timestamp after which it is eligible for deletion.
    pub scheduled_for_deletion: u64,
    /// On-disk size in bytes.
    pub size_bytes: u64,
    /// The original path that was attempted to resolve, if known.
    pub attempted_path: Option<String>,
}

/// Aggregate counters surfaced in `registry.json` and health checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatistics {
    /// Number of active (non-orphaned) workspaces.
    pub total_workspaces: usize,
    /// Number of orphan candidates awaiting or past their grace period.
    pub total_orphans: usize,
    /// Sum of every index's on-disk size.
    pub total_index_size_bytes: u64,
    /// Sum of every index's document count.
    pub total_documents: u64,
}

/// The persistent, process-wide catalog of known workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    /// Registry schema version, bumped on breaking format changes.
    pub version: String,
    /// RFC3339 timestamp of the last write.
    pub last_updated: String,
    /// Known workspaces keyed by hash.
    pub workspaces: HashMap<String, Workspace>,
    /// Orphan candidates keyed by directory name.
    pub orphaned_indexes: HashMap<String, OrphanedIndex>,
    /// Aggregate counters recomputed on every write.
    pub statistics: RegistryStatistics,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            version: "1.0".to_owned(),
            last_updated: chrono::Utc::now().to_rfc3339(),
            workspaces: HashMap::new(),
            orphaned_indexes: HashMap::new(),
            statistics: RegistryStatistics::default(),
        }
    }
}

impl Registry {
    /// Recompute `statistics` from the current workspace/orphan maps.
    pub fn recompute_statistics(&mut self) {
        self.statistics = RegistryStatistics {
            total_workspaces: self.workspaces.len(),
            total_orphans: self.orphaned_indexes.len(),
            total_index_size_bytes: self.workspaces.values().map(|w| w.index_size_bytes).sum(),
            total_documents: self.workspaces.values().map(|w| w.document_count).sum(),
        };
    }
}
