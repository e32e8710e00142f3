//! Default values for the configuration keys listed in the external
//! interfaces section. `codesearch-infrastructure::config` layers these
//! under file/env overrides; nothing here reads the filesystem.

/// Default base directory name, relative to the user's home directory.
pub const DEFAULT_BASE_DIR_NAME: &str = ".codesearch";

/// Maximum file size eligible for indexing (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Files above this size are read via memory-mapping instead of a copy.
pub const DEFAULT_LARGE_FILE_THRESHOLD_BYTES: u64 = 1024 * 1024;

/// Hard upper bound on results returned from any single query.
pub const DEFAULT_MAX_ALLOWED_RESULTS: usize = 10_000;

/// Maximum number of documents batched into one writer commit.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// RAM buffer budget for the index writer, floor 16 MiB.
pub const DEFAULT_RAM_BUFFER_MIB: usize = 256;
/// Minimum allowed RAM buffer, regardless of configuration.
pub const MIN_RAM_BUFFER_MIB: usize = 16;

/// Bounded worker pool size for indexing.
pub const DEFAULT_INDEXING_MAX_CONCURRENCY: usize = 8;
/// Bounded queue size feeding the indexing worker pool.
pub const DEFAULT_INDEXING_MAX_QUEUE_SIZE: usize = 80;

/// Debounce window for coalescing bursts of filesystem modify events.
pub const DEFAULT_WATCHER_DEBOUNCE_MS: u64 = 500;
/// Quiet period used to detect atomic-write delete+create pairs.
pub const DEFAULT_WATCHER_QUIET_MS: u64 = 5_000;

/// Age past which a writer lock is considered stale.
pub const DEFAULT_LOCKS_STALE_MINUTES: u64 = 15;

/// Byte budget for the query-result cache.
pub const DEFAULT_CACHE_MAX_BYTES: u64 = 100 * 1024 * 1024;
/// Time-to-live for cached query results.
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 15;

/// Idle cutoff after which an unused index handle is evicted.
pub const DEFAULT_IDLE_INDEX_CLEANUP_MINUTES: u64 = 15;
/// Maximum number of index handles held open at once.
pub const DEFAULT_MAX_ACTIVE_INDEXES: usize = 100;

/// Per-file result cap within a single search response.
pub const DEFAULT_PER_FILE_RESULT_CAP: usize = 10;
/// Total result cap for a single search response.
pub const DEFAULT_TOTAL_RESULT_CAP: usize = 100;

/// Default number of context lines before/after a matched span.
pub const DEFAULT_CONTEXT_LINES: usize = 2;

/// Default hard query timeout.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Default grace period before an orphaned index is scheduled for deletion.
pub const DEFAULT_ORPHAN_GRACE_PERIOD_DAYS: u64 = 14;

/// Characters-per-token approximation used for response token budgeting.
pub const CHARS_PER_TOKEN: usize = 4;
/// Allowed overshoot of the reported token estimate vs. the requested budget.
pub const TOKEN_BUDGET_MARGIN: f64 = 0.05;

/// Maximum canonical path length accepted by the path resolver.
pub const MAX_PATH_LENGTH: usize = 240;

/// Number of consecutive per-file IO errors in a subtree before it is skipped.
pub const MAX_CONSECUTIVE_SUBTREE_ERRORS: usize = 10;

/// Number of consecutive indexing failures before the circuit breaker opens.
pub const BREAKER_FAILURE_THRESHOLD: u32 = 3;

/// Initial cooldown applied when the circuit breaker opens.
pub const BREAKER_INITIAL_COOLDOWN_SECS: u64 = 30;
