//! `PathResolver` (spec.md §4.1): deterministic mapping from a workspace
//! path to its index directory name, plus canonical locations for indexes,
//! logs, and the registry under a single base directory.
//!
//! Grounded on the `<name>_<hash8>` id scheme used by COA-style workspace
//! registries (see `generate_workspace_id` in the corpus) and the
//! teacher's `PathBuf`-based workspace exploration style.

use codesearch_domain::constants::MAX_PATH_LENGTH;
use codesearch_domain::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Resolves canonical, collision-resistant paths for one base directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
}

impl PathResolver {
    /// Build a resolver rooted at `base_dir` (e.g. `~/.codesearch`).
    #[must_use]
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The root directory all state lives under.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base>/indexes/`.
    #[must_use]
    pub fn indexes_dir(&self) -> PathBuf {
        self.base_dir.join("indexes")
    }

    /// `<base>/logs/`.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// `<base>/indexes/registry.json`.
    #[must_use]
    pub fn registry_file(&self) -> PathBuf {
        self.indexes_dir().join("registry.json")
    }

    /// `<base>/indexes/<basename>_<hash>/` for workspace path `workspace`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if canonicalization fails or the
    /// resulting path is rejected (see [`canonicalize_workspace_path`]).
    pub fn index_dir_for(&self, workspace: &Path) -> Result<PathBuf> {
        let name = directory_name_for(workspace)?;
        Ok(self.indexes_dir().join(name))
    }

    /// `<index_dir>/write.lock`.
    #[must_use]
    pub fn lock_file(&self, index_dir: &Path) -> PathBuf {
        index_dir.join("write.lock")
    }
}

/// Canonicalize `path`: trim trailing separators, resolve `.`/`..`, and
/// reject parent traversal, excessive length, or control characters.
///
/// Case is normalized only when the underlying filesystem is
/// case-insensitive; on Unix-like systems (the only target this crate
/// canonicalizes for) paths are case-preserving, so no folding happens
/// here.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` does not exist, or
/// [`Error::InvalidPath`] for traversal, length, or control-character
/// violations.
pub fn canonicalize_workspace_path(path: &Path) -> Result<PathBuf> {
    let trimmed = trim_trailing_separators(path);

    let canonical = trimmed
        .canonicalize()
        .map_err(|_| Error::NotFound { resource: trimmed.display().to_string() })?;

    let as_str = canonical.to_string_lossy();
    if as_str.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidPath {
            path: as_str.into_owned(),
            reason: "contains control characters".to_owned(),
        });
    }
    if as_str.len() > MAX_PATH_LENGTH {
        return Err(Error::InvalidPath {
            path: as_str.into_owned(),
            reason: format!("exceeds {MAX_PATH_LENGTH} characters"),
        });
    }
    if canonical.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(Error::InvalidPath {
            path: as_str.into_owned(),
            reason: "contains parent traversal after canonicalization".to_owned(),
        });
    }

    Ok(canonical)
}

fn trim_trailing_separators(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(trimmed)
    }
}

/// Compute `<sanitized-basename>_<short-hash>` for `workspace`.
///
/// # Errors
///
/// Propagates [`canonicalize_workspace_path`] failures.
pub fn directory_name_for(workspace: &Path) -> Result<String> {
    let canonical = canonicalize_workspace_path(workspace)?;
    let hash = short_hash(&canonical);
    let basename = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workspace".to_owned());
    Ok(format!("{}_{hash}", sanitize_basename(&basename)))
}

/// First 8 hex characters of the SHA-256 digest of `path`'s lossy string
/// form. Stable across process restarts; collisions are astronomically
/// unlikely for the number of workspaces a single host indexes.
#[must_use]
pub fn short_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..8].to_owned()
}

/// Replace filesystem-unsafe characters, lowercase, and cap length so the
/// final `<name>_<hash>` directory name stays well under common path
/// limits.
#[must_use]
pub fn sanitize_basename(name: &str) -> String {
    const INVALID: [char; 10] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' '];
    let mut sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| if INVALID.contains(&c) { '_' } else { c })
        .collect();
    sanitized.truncate(50);
    if !sanitized.chars().next().is_some_and(char::is_alphanumeric) {
        sanitized = format!("ws_{sanitized}");
    }
    if sanitized.is_empty() {
        sanitized = "workspace".to_owned();
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_unsafe_characters() {
        assert_eq!(sanitize_basename("My Project: v2"), "my_project__v2");
    }

    #[test]
    fn directory_name_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = directory_name_for(dir.path()).unwrap();
        let b = directory_name_for(dir.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_missing_path() {
        let missing = Path::new("/definitely/does/not/exist/xyz123");
        assert!(canonicalize_workspace_path(missing).is_err());
    }

    #[test]
    fn resolver_paths_compose_under_base() {
        let resolver = PathResolver::new(PathBuf::from("/base"));
        assert_eq!(resolver.indexes_dir(), PathBuf::from("/base/indexes"));
        assert_eq!(resolver.logs_dir(), PathBuf::from("/base/logs"));
        assert_eq!(resolver.registry_file(), PathBuf::from("/base/indexes/registry.json"));
    }
}
