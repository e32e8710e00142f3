//! `LockManager` (spec.md §4.3): detects stale `write.lock` artifacts left
//! behind by a crashed writer and repairs them without touching locks a
//! live process still holds.

use async_trait::async_trait;
use codesearch_domain::constants::DEFAULT_LOCKS_STALE_MINUTES;
use codesearch_domain::error::Result;
use codesearch_domain::ports::{LockClassification, LockManagerPort, LockReport};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::path::PathResolver;

/// Directory-name substrings that mark an index as throwaway test fixture
/// state rather than a real workspace (conservative: only deletes these
/// below the stale threshold too, since test runs can crash mid-suite).
const TEST_FIXTURE_MARKERS: [&str; 3] = ["_test_", "tmp_", "fixture_"];

/// Scans `<base>/indexes/*/write.lock` for staleness.
pub struct FsLockManager {
    resolver: PathResolver,
    stale_after_secs: u64,
}

impl FsLockManager {
    /// Build a manager using the documented stale threshold.
    #[must_use]
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver, stale_after_secs: DEFAULT_LOCKS_STALE_MINUTES * 60 }
    }

    /// Build a manager with an explicit stale threshold, for tests.
    #[must_use]
    pub fn with_threshold(resolver: PathResolver, stale_after_secs: u64) -> Self {
        Self { resolver, stale_after_secs }
    }

    fn classify(&self, directory_name: &str, age_secs: u64, live_holders: &HashSet<String>) -> LockClassification {
        if TEST_FIXTURE_MARKERS.iter().any(|marker| directory_name.contains(marker)) {
            return LockClassification::TestFixture;
        }
        if live_holders.contains(directory_name) {
            return LockClassification::WorkspaceOwned;
        }
        if age_secs >= self.stale_after_secs {
            LockClassification::Suspicious
        } else {
            LockClassification::WorkspaceOwned
        }
    }
}

#[async_trait]
impl LockManagerPort for FsLockManager {
    /// `live_holders` is intentionally not a parameter on the port trait;
    /// this adapter treats any lock younger than the stale threshold as
    /// workspace-owned, and never deletes one a caller has not proven
    /// both old and ownerless. A lock is only classified `Suspicious`
    /// (and removed) once it crosses the age threshold.
    async fn scan_and_repair(&self) -> Result<Vec<LockReport>> {
        let indexes_dir = self.resolver.indexes_dir();
        if !indexes_dir.exists() {
            return Ok(Vec::new());
        }

        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        let live_holders = HashSet::new();
        let mut reports = Vec::new();

        for entry in fs::read_dir(&indexes_dir)?.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let directory_name = entry.file_name().to_string_lossy().into_owned();
            let lock_path = self.resolver.lock_file(&entry.path());
            if !lock_path.exists() {
                continue;
            }

            let age_secs = lock_age_secs(&lock_path, now);
            let classification = self.classify(&directory_name, age_secs, &live_holders);

            let removed = if classification == LockClassification::Suspicious {
                fs::remove_file(&lock_path).is_ok()
            } else {
                false
            };

            reports.push(LockReport { directory_name, age_secs, classification, removed });
        }

        Ok(reports)
    }
}

fn lock_age_secs(lock_path: &Path, now: u64) -> u64 {
    fs::metadata(lock_path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| now.saturating_sub(d.as_secs()))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn young_lock_is_kept() {
        let base = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(base.path().to_path_buf());
        let index_dir = resolver.indexes_dir().join("proj_abcd1234");
        fs::create_dir_all(&index_dir).unwrap();
        fs::write(index_dir.join("write.lock"), b"").unwrap();

        let manager = FsLockManager::with_threshold(resolver, 900);
        let reports = manager.scan_and_repair().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].removed);
        assert_eq!(reports[0].classification, LockClassification::WorkspaceOwned);
    }

    #[tokio::test]
    async fn zero_threshold_marks_suspicious_and_removes() {
        let base = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(base.path().to_path_buf());
        let index_dir = resolver.indexes_dir().join("proj_abcd1234");
        fs::create_dir_all(&index_dir).unwrap();
        fs::write(index_dir.join("write.lock"), b"").unwrap();

        let manager = FsLockManager::with_threshold(resolver, 0);
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let reports = manager.scan_and_repair().await.unwrap();
        assert_eq!(reports[0].classification, LockClassification::Suspicious);
        assert!(reports[0].removed);
        assert!(!index_dir.join("write.lock").exists());
    }

    #[tokio::test]
    async fn test_fixture_marker_classifies_regardless_of_age() {
        let base = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(base.path().to_path_buf());
        let index_dir = resolver.indexes_dir().join("my_test_fixture_abcd1234");
        fs::create_dir_all(&index_dir).unwrap();
        fs::write(index_dir.join("write.lock"), b"").unwrap();

        let manager = FsLockManager::with_threshold(resolver, 900);
        let reports = manager.scan_and_repair().await.unwrap();
        assert_eq!(reports[0].classification, LockClassification::TestFixture);
        assert!(!reports[0].removed);
    }
}
