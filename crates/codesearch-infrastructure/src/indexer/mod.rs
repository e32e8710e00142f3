//! `FileIndexer` (spec.md §4.6): walks a workspace tree honoring
//! `.gitignore`, filters by size/extension, reads content (memory-mapping
//! large files), and turns each eligible file into a [`Document`].
//!
//! Grounded on the corpus's `ignore::WalkBuilder`-based tree walkers,
//! generalized with the size/extension filtering and binary-file
//! detection the indexing pipeline needs.

use codesearch_domain::constants::{
    DEFAULT_LARGE_FILE_THRESHOLD_BYTES, DEFAULT_MAX_FILE_SIZE_BYTES, MAX_CONSECUTIVE_SUBTREE_ERRORS,
};
use codesearch_domain::error::Result;
use codesearch_domain::value_objects::Document;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Filters applied while walking a workspace.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Files larger than this are skipped entirely.
    pub max_file_size_bytes: u64,
    /// Files larger than this are read via memory-mapping.
    pub large_file_threshold_bytes: u64,
    /// When set, only these lowercased extensions (no leading dot) are indexed.
    pub extensions: Option<HashSet<String>>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            large_file_threshold_bytes: DEFAULT_LARGE_FILE_THRESHOLD_BYTES,
            extensions: None,
        }
    }
}

/// Counters describing one walk's outcome.
#[derive(Debug, Clone, Default)]
pub struct IndexingStats {
    /// Files visited by the walker, including skipped/failed ones.
    pub files_scanned: u64,
    /// Files successfully turned into a [`Document`].
    pub files_indexed: u64,
    /// Files skipped by a filter (size, extension, binary content).
    pub files_skipped: u64,
    /// Files that errored while being read.
    pub files_failed: u64,
    /// Total bytes read across all indexed files.
    pub bytes_read: u64,
}

/// Walks a workspace tree and produces [`Document`]s.
pub struct FileIndexer {
    config: IndexerConfig,
}

impl FileIndexer {
    /// Build an indexer with `config`.
    #[must_use]
    pub fn new(config: IndexerConfig) -> Self {
        Self { config }
    }

    /// Walk `workspace_root`, honoring `.gitignore`, and return every
    /// eligible document plus aggregate stats. After
    /// [`MAX_CONSECUTIVE_SUBTREE_ERRORS`] back-to-back failures the walk
    /// stops early rather than continuing to fail against, e.g., an
    /// unreadable mount.
    ///
    /// # Errors
    ///
    /// Returns an error only if the root itself cannot be walked; a
    /// single file's read failure is recorded in `IndexingStats` instead.
    pub fn walk(&self, workspace_root: &Path) -> Result<(Vec<Document>, IndexingStats)> {
        let mut stats = IndexingStats::default();
        let mut documents = Vec::new();
        let mut consecutive_errors = 0usize;

        let walker = WalkBuilder::new(workspace_root).hidden(false).git_ignore(true).git_exclude(true).build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => {
                    consecutive_errors += 1;
                    stats.files_failed += 1;
                    if consecutive_errors >= MAX_CONSECUTIVE_SUBTREE_ERRORS {
                        break;
                    }
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            stats.files_scanned += 1;

            match self.read_document(entry.path(), workspace_root) {
                Ok(Some(document)) => {
                    stats.bytes_read += document.size;
                    documents.push(document);
                    stats.files_indexed += 1;
                    consecutive_errors = 0;
                }
                Ok(None) => {
                    stats.files_skipped += 1;
                    consecutive_errors = 0;
                }
                Err(_) => {
                    stats.files_failed += 1;
                    consecutive_errors += 1;
                    if consecutive_errors >= MAX_CONSECUTIVE_SUBTREE_ERRORS {
                        break;
                    }
                }
            }
        }

        Ok((documents, stats))
    }

    fn read_document(&self, path: &Path, workspace_root: &Path) -> Result<Option<Document>> {
        let metadata = fs::metadata(path)?;
        if metadata.len() > self.config.max_file_size_bytes {
            return Ok(None);
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
        if let Some(allowed) = &self.config.extensions {
            if !allowed.contains(&extension) {
                return Ok(None);
            }
        }

        let bytes = read_bytes(path, metadata.len(), self.config.large_file_threshold_bytes)?;
        if is_binary(&bytes) {
            return Ok(None);
        }
        let content = String::from_utf8_lossy(&bytes).into_owned();

        let relative_path = path.strip_prefix(workspace_root).unwrap_or(path).to_string_lossy().into_owned();
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let language = language_for_extension(&extension);
        let modified_ticks = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| Document::ticks_from_unix_seconds(i64::try_from(d.as_secs()).unwrap_or(0), d.subsec_nanos()))
            .unwrap_or(0);

        Ok(Some(Document {
            path: path.display().to_string(),
            relative_path,
            filename,
            extension,
            language,
            size: metadata.len(),
            modified_ticks,
            content,
        }))
    }
}

#[allow(unsafe_code)]
fn read_bytes(path: &Path, len: u64, large_file_threshold_bytes: u64) -> Result<Vec<u8>> {
    if len <= large_file_threshold_bytes {
        return Ok(fs::read(path)?);
    }
    let file = fs::File::open(path)?;
    // SAFETY: the file is opened read-only immediately above and not
    // shared with any writer for the lifetime of this mapping.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(mmap.to_vec())
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8000).any(|&b| b == 0)
}

fn language_for_extension(extension: &str) -> String {
    match extension {
        "rs" => "rust",
        "py" => "python",
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "sh" | "bash" => "shell",
        _ => "plaintext",
    }
    .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    #[test]
    fn indexes_text_files_and_skips_binary() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("a.rs"), "fn main() {}").unwrap();
        stdfs::write(dir.path().join("binary.bin"), [0u8, 1, 2, 0, 3]).unwrap();

        let indexer = FileIndexer::new(IndexerConfig::default());
        let (documents, stats) = indexer.walk(dir.path()).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "a.rs");
        assert_eq!(stats.files_indexed, 1);
        assert_eq!(stats.files_skipped, 1);
    }

    #[test]
    fn skips_files_above_max_size() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("big.rs"), vec![b'a'; 128]).unwrap();

        let config = IndexerConfig { max_file_size_bytes: 16, ..IndexerConfig::default() };
        let indexer = FileIndexer::new(config);
        let (documents, stats) = indexer.walk(dir.path()).unwrap();

        assert!(documents.is_empty());
        assert_eq!(stats.files_skipped, 1);
    }

    #[test]
    fn extension_filter_restricts_results() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("a.rs"), "fn main() {}").unwrap();
        stdfs::write(dir.path().join("a.py"), "def main(): pass").unwrap();

        let mut extensions = HashSet::new();
        extensions.insert("rs".to_owned());
        let config = IndexerConfig { extensions: Some(extensions), ..IndexerConfig::default() };
        let indexer = FileIndexer::new(config);
        let (documents, _) = indexer.walk(dir.path()).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].extension, "rs");
    }
}
