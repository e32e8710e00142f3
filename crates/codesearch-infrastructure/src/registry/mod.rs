//! `WorkspaceRegistry` (spec.md §3, §4.2): the persistent catalog of
//! known workspaces and orphan candidates, backed by a single
//! `registry.json` written atomically under a cross-process file lock.
//!
//! Grounded on the corpus's JSON-catalog registries (atomic
//! temp-file-then-rename writes, in-memory cache refreshed from disk on
//! every mutating call) adapted to the content-addressed workspace model.

use async_trait::async_trait;
use codesearch_domain::constants::DEFAULT_ORPHAN_GRACE_PERIOD_DAYS;
use codesearch_domain::error::{Error, Result};
use codesearch_domain::ports::{ReconcileReport, WorkspaceRegistryPort};
use codesearch_domain::value_objects::{
    OrphanReason, OrphanedIndex, Registry, Workspace, WorkspaceStatus,
};
use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::path::{directory_name_for, sanitize_basename, short_hash, PathResolver};

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// `registry.json`-backed implementation of [`WorkspaceRegistryPort`].
pub struct JsonWorkspaceRegistry {
    resolver: PathResolver,
    state: Mutex<Registry>,
}

impl JsonWorkspaceRegistry {
    /// Load (or initialize) the registry rooted at `resolver`'s base
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry file exists but cannot be parsed
    /// and the caller has not yet called [`Self::recover_or_rebuild`].
    pub fn open(resolver: PathResolver) -> Result<Self> {
        fs::create_dir_all(resolver.indexes_dir())?;
        let registry = load_or_default(&resolver.registry_file())?;
        Ok(Self { resolver, state: Mutex::new(registry) })
    }

    /// Load the registry, falling back to an empty one and surfacing
    /// [`Error::RegistryCorrupt`] instead of failing outright when the
    /// file is unreadable.
    ///
    /// # Errors
    ///
    /// Propagates directory-creation failures; a corrupt registry file
    /// is recovered rather than returned as an error.
    pub fn recover_or_rebuild(resolver: PathResolver) -> Result<(Self, bool)> {
        fs::create_dir_all(resolver.indexes_dir())?;
        let path = resolver.registry_file();
        match load_or_default(&path) {
            Ok(registry) => Ok((Self { resolver, state: Mutex::new(registry) }, false)),
            Err(_) => {
                let registry = Registry::default();
                let instance = Self { resolver, state: Mutex::new(registry) };
                instance.persist()?;
                Ok((instance, true))
            }
        }
    }

    fn persist(&self) -> Result<()> {
        let path = self.resolver.registry_file();
        let lock_path = path.with_extension("json.lock");
        let lock_file = OpenOptions::new().create(true).write(true).truncate(false).open(&lock_path)?;
        lock_file.lock_exclusive().map_err(|_| Error::IndexLocked)?;

        let mut guard = self.state.lock();
        guard.recompute_statistics();
        guard.last_updated = chrono::Utc::now().to_rfc3339();
        let serialized = serde_json::to_vec_pretty(&*guard)?;
        drop(guard);

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &serialized)?;
        fs::rename(&tmp_path, &path)?;

        lock_file.unlock().ok();
        Ok(())
    }

    fn index_dir(&self, directory_name: &str) -> PathBuf {
        self.resolver.indexes_dir().join(directory_name)
    }
}

fn load_or_default(path: &Path) -> Result<Registry> {
    if !path.exists() {
        return Ok(Registry::default());
    }
    let bytes = fs::read(path)?;
    let registry: Registry = serde_json::from_slice(&bytes)?;
    Ok(registry)
}

#[async_trait]
impl WorkspaceRegistryPort for JsonWorkspaceRegistry {
    async fn get_or_create(&self, original_path: &str) -> Result<Workspace> {
        let canonical = crate::path::canonicalize_workspace_path(Path::new(original_path))?;
        let hash = short_hash(&canonical);

        {
            let guard = self.state.lock();
            if let Some(existing) = guard.workspaces.get(&hash) {
                return Ok(existing.clone());
            }
        }

        let directory_name = directory_name_for(&canonical)?;
        let basename = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_owned());
        let now = now_secs();
        let workspace = Workspace {
            hash: hash.clone(),
            original_path: canonical.display().to_string(),
            directory_name,
            display_name: sanitize_basename(&basename),
            status: WorkspaceStatus::Active,
            created_at: now,
            last_accessed: now,
            document_count: 0,
            index_size_bytes: 0,
            locked_by: None,
        };

        self.state.lock().workspaces.insert(hash, workspace.clone());
        self.persist()?;
        Ok(workspace)
    }

    async fn list(&self) -> Result<Vec<Workspace>> {
        Ok(self.state.lock().workspaces.values().cloned().collect())
    }

    async fn list_orphans(&self) -> Result<Vec<OrphanedIndex>> {
        Ok(self.state.lock().orphaned_indexes.values().cloned().collect())
    }

    async fn update(&self, entry: Workspace) -> Result<()> {
        self.state.lock().workspaces.insert(entry.hash.clone(), entry);
        self.persist()
    }

    async fn remove(&self, hash: &str) -> Result<()> {
        self.state.lock().workspaces.remove(hash);
        self.persist()
    }

    async fn scan_and_reconcile(&self) -> Result<ReconcileReport> {
        let indexes_dir = self.resolver.indexes_dir();
        if !indexes_dir.exists() {
            return Ok(ReconcileReport::default());
        }

        let mut report = ReconcileReport::default();
        let known_dirs: HashMap<String, String> = {
            let guard = self.state.lock();
            guard.workspaces.iter().map(|(hash, w)| (w.directory_name.clone(), hash.clone())).collect()
        };

        let entries = fs::read_dir(&indexes_dir)?;
        let mut seen_dirs = Vec::new();
        for entry in entries.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            seen_dirs.push(dir_name.clone());

            if let Some(hash) = known_dirs.get(&dir_name) {
                let path_missing = {
                    let guard = self.state.lock();
                    guard
                        .workspaces
                        .get(hash)
                        .map(|w| !Path::new(&w.original_path).exists())
                        .unwrap_or(true)
                };
                if path_missing {
                    let mut guard = self.state.lock();
                    if let Some(w) = guard.workspaces.get_mut(hash) {
                        if w.status != WorkspaceStatus::Missing {
                            w.status = WorkspaceStatus::Missing;
                            report.status_changes += 1;
                        }
                    }
                }
                continue;
            }

            let already_orphan = self.state.lock().orphaned_indexes.contains_key(&dir_name);
            if already_orphan {
                continue;
            }

            let metadata = fs::metadata(entry.path())?;
            let last_modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or_else(now_secs);
            let size_bytes = dir_size(&entry.path());
            let discovered_at = now_secs();
            let grace_secs = DEFAULT_ORPHAN_GRACE_PERIOD_DAYS * 24 * 60 * 60;

            let orphan = OrphanedIndex {
                directory_name: dir_name.clone(),
                discovered_at,
                last_modified,
                reason: OrphanReason::NoMetadata,
                scheduled_for_deletion: discovered_at + grace_secs,
                size_bytes,
                attempted_path: None,
            };
            self.state.lock().orphaned_indexes.insert(dir_name, orphan);
            report.new_orphans += 1;
        }

        let now = now_secs();
        let due: Vec<String> = {
            let guard = self.state.lock();
            guard
                .orphaned_indexes
                .iter()
                .filter(|(_, o)| o.scheduled_for_deletion <= now)
                .map(|(name, _)| name.clone())
                .collect()
        };
        for name in due {
            let dir = self.index_dir(&name);
            if dir.is_dir() {
                fs::remove_dir_all(&dir)?;
            }
            self.state.lock().orphaned_indexes.remove(&name);
            report.reaped += 1;
        }

        self.persist()?;
        Ok(report)
    }

    async fn migrate_from_legacy(&self) -> Result<usize> {
        let indexes_dir = self.resolver.indexes_dir();
        if !indexes_dir.exists() {
            return Ok(0);
        }

        let mut migrated = 0usize;
        for entry in fs::read_dir(&indexes_dir)?.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let legacy_metadata = entry.path().join("metadata.json");
            if !legacy_metadata.exists() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            let already_known =
                self.state.lock().workspaces.values().any(|w| w.directory_name == dir_name);
            if already_known {
                continue;
            }

            let bytes = match fs::read(&legacy_metadata) {
                Ok(bytes) => bytes,
                Err(_) => continue,
            };
            let legacy: serde_json::Value = match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(_) => continue,
            };
            let original_path = legacy
                .get("originalPath")
                .or_else(|| legacy.get("original_path"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned();
            if original_path.is_empty() {
                continue;
            }

            let hash = short_hash(Path::new(&original_path));
            let now = now_secs();
            let status =
                if Path::new(&original_path).exists() { WorkspaceStatus::Active } else { WorkspaceStatus::Missing };
            let workspace = Workspace {
                hash: hash.clone(),
                original_path: original_path.clone(),
                directory_name: dir_name,
                display_name: sanitize_basename(
                    Path::new(&original_path).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default().as_str(),
                ),
                status,
                created_at: now,
                last_accessed: now,
                document_count: 0,
                index_size_bytes: 0,
                locked_by: None,
            };
            self.state.lock().workspaces.insert(hash, workspace);
            migrated += 1;
        }

        if migrated > 0 {
            self.persist()?;
        }
        Ok(migrated)
    }
}

fn dir_size(path: &Path) -> u64 {
    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(base.path().to_path_buf());
        let registry = JsonWorkspaceRegistry::open(resolver).unwrap();

        let first = registry.get_or_create(workspace.path().to_str().unwrap()).await.unwrap();
        let second = registry.get_or_create(workspace.path().to_str().unwrap()).await.unwrap();
        assert_eq!(first.hash, second.hash);
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_registry_is_rebuilt_not_fatal() {
        let base = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(base.path().to_path_buf());
        fs::create_dir_all(resolver.indexes_dir()).unwrap();
        fs::write(resolver.registry_file(), b"not json").unwrap();

        let (registry, rebuilt) = JsonWorkspaceRegistry::recover_or_rebuild(resolver).unwrap();
        assert!(rebuilt);
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconcile_marks_unreferenced_directory_as_orphan() {
        let base = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(base.path().to_path_buf());
        let registry = JsonWorkspaceRegistry::open(resolver).unwrap();
        fs::create_dir_all(registry.resolver.indexes_dir().join("stray_abcd1234")).unwrap();

        let report = registry.scan_and_reconcile().await.unwrap();
        assert_eq!(report.new_orphans, 1);
        assert_eq!(registry.list_orphans().await.unwrap().len(), 1);
    }
}
