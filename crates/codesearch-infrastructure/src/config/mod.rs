//! Layered configuration (defaults → `config.toml` → environment),
//! mirroring the engine-wide defaults in `codesearch_domain::constants`.

use codesearch_domain::constants::{
    DEFAULT_BASE_DIR_NAME, DEFAULT_CACHE_MAX_BYTES, DEFAULT_CACHE_TTL_MINUTES, DEFAULT_CONTEXT_LINES,
    DEFAULT_IDLE_INDEX_CLEANUP_MINUTES, DEFAULT_INDEXING_MAX_CONCURRENCY, DEFAULT_INDEXING_MAX_QUEUE_SIZE,
    DEFAULT_LOCKS_STALE_MINUTES, DEFAULT_MAX_ACTIVE_INDEXES, DEFAULT_MAX_ALLOWED_RESULTS, DEFAULT_MAX_BATCH_SIZE,
    DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_PER_FILE_RESULT_CAP, DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_RAM_BUFFER_MIB,
    DEFAULT_TOTAL_RESULT_CAP, DEFAULT_WATCHER_DEBOUNCE_MS, DEFAULT_WATCHER_QUIET_MS,
};
use codesearch_domain::error::{Error, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine-wide configuration, layered from defaults, an optional
/// `config.toml`, and `CODESEARCH_*` environment variables (highest
/// precedence).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root directory for indexes, logs, and the registry.
    pub base_dir: PathBuf,
    /// Maximum file size eligible for indexing.
    pub max_file_size_bytes: u64,
    /// Hard upper bound on results returned from a single query.
    pub max_allowed_results: usize,
    /// Maximum documents batched into one writer commit.
    pub max_batch_size: usize,
    /// Writer RAM buffer size in MiB.
    pub ram_buffer_mib: usize,
    /// Bounded worker pool size for indexing.
    pub indexing_max_concurrency: usize,
    /// Bounded queue size feeding the indexing worker pool.
    pub indexing_max_queue_size: usize,
    /// Debounce window for coalescing filesystem events, in milliseconds.
    pub watcher_debounce_ms: u64,
    /// Quiet period for atomic-write detection, in milliseconds.
    pub watcher_quiet_ms: u64,
    /// Age past which a writer lock is considered stale, in minutes.
    pub locks_stale_minutes: u64,
    /// Byte budget for the query-result cache.
    pub cache_max_bytes: u64,
    /// Time-to-live for cached query results, in minutes.
    pub cache_ttl_minutes: u64,
    /// Idle cutoff after which an unused index handle is evicted, in minutes.
    pub idle_index_cleanup_minutes: u64,
    /// Maximum number of index handles held open at once.
    pub max_active_indexes: usize,
    /// Per-file result cap within a single search response.
    pub per_file_result_cap: usize,
    /// Total result cap for a single search response.
    pub total_result_cap: usize,
    /// Default number of context lines before/after a matched span.
    pub context_lines: usize,
    /// Hard query timeout, in seconds.
    pub query_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            max_allowed_results: DEFAULT_MAX_ALLOWED_RESULTS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            ram_buffer_mib: DEFAULT_RAM_BUFFER_MIB,
            indexing_max_concurrency: DEFAULT_INDEXING_MAX_CONCURRENCY,
            indexing_max_queue_size: DEFAULT_INDEXING_MAX_QUEUE_SIZE,
            watcher_debounce_ms: DEFAULT_WATCHER_DEBOUNCE_MS,
            watcher_quiet_ms: DEFAULT_WATCHER_QUIET_MS,
            locks_stale_minutes: DEFAULT_LOCKS_STALE_MINUTES,
            cache_max_bytes: DEFAULT_CACHE_MAX_BYTES,
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            idle_index_cleanup_minutes: DEFAULT_IDLE_INDEX_CLEANUP_MINUTES,
            max_active_indexes: DEFAULT_MAX_ACTIVE_INDEXES,
            per_file_result_cap: DEFAULT_PER_FILE_RESULT_CAP,
            total_result_cap: DEFAULT_TOTAL_RESULT_CAP,
            context_lines: DEFAULT_CONTEXT_LINES,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        }
    }
}

fn default_base_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(DEFAULT_BASE_DIR_NAME)
}

impl Config {
    /// Load configuration layering defaults under `<base_dir>/config.toml`
    /// (if present) under `CODESEARCH_*` environment variables.
    ///
    /// `base_dir` is resolved first (env override, then an explicit
    /// override file path, then the default) since it determines where to
    /// look for `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the layered configuration fails to
    /// deserialize (e.g. a malformed `config.toml`).
    pub fn load(explicit_base_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = explicit_base_dir
            .or_else(|| std::env::var("CODESEARCH_BASE_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(default_base_dir);
        let config_file = base_dir.join("config.toml");

        let figment = Figment::new()
            .merge(Serialized::defaults(Config { base_dir: base_dir.clone(), ..Config::default() }))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CODESEARCH_"));

        figment.extract().map_err(|e| Error::Invariant { message: format!("failed to load configuration: {e}") })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_domain_constants() {
        let config = Config::default();
        assert_eq!(config.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES);
        assert_eq!(config.ram_buffer_mib, DEFAULT_RAM_BUFFER_MIB);
    }

    #[test]
    fn load_without_config_file_succeeds() {
        let base = tempfile::tempdir().unwrap();
        let config = Config::load(Some(base.path().to_path_buf())).unwrap();
        assert_eq!(config.base_dir, base.path());
        assert_eq!(config.total_result_cap, DEFAULT_TOTAL_RESULT_CAP);
    }
}
