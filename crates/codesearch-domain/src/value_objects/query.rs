//! The `Query` value object and its supporting enums (spec.md §3, §4.8).

use serde::{Deserialize, Serialize};

/// Which field/strategy a search should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// Inspect the query text and route to the best-fitting mode.
    Auto,
    /// Default boolean parse against `content`.
    Standard,
    /// Exact substring match against `content_literal`.
    Literal,
    /// Boolean-AND of code-aware tokens against `content_code`.
    Code,
    /// Identifier search against `content_symbols`.
    Symbol,
    /// Edit-distance search against `content`.
    Fuzzy,
    /// Regex search against `content`.
    Regex,
}

/// How a response should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseMode {
    /// Counts, hotspots, and a handful of representative hits.
    Summary,
    /// Every hit with full snippets.
    Full,
    /// Start at `Full`, downgrade to `Summary` if the token budget is tight.
    Adaptive,
}

/// Filters narrowing a search to a subset of the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    /// Allowed file extensions (without the leading dot), if any.
    pub extensions: Option<Vec<String>>,
    /// Glob patterns a path must match to be included.
    pub include_globs: Option<Vec<String>>,
    /// Glob patterns that exclude an otherwise-matching path.
    pub exclude_globs: Option<Vec<String>>,
    /// Inclusive file-size range in bytes.
    pub size_range: Option<(u64, u64)>,
    /// Only include files modified at or after this Unix timestamp.
    pub modified_since: Option<u64>,
}

/// An immutable search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Raw query text as supplied by the caller.
    pub text: String,
    /// Search mode/field strategy.
    pub mode: SearchMode,
    /// Structural filters applied before ranking.
    pub filters: QueryFilters,
    /// How the response should be shaped.
    pub response_mode: ResponseMode,
    /// Soft token budget for the response, if any.
    pub max_tokens: Option<usize>,
    /// Total hit cap across all files.
    pub limit: usize,
    /// Per-file hit cap.
    pub per_file_limit: usize,
    /// Bypass cache read and write for this request.
    pub no_cache: bool,
}

impl Query {
    /// Construct a query with the engine's documented defaults.
    #[must_use]
    pub fn new(text: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            text: text.into(),
            mode,
            filters: QueryFilters::default(),
            response_mode: ResponseMode::Adaptive,
            max_tokens: None,
            limit: crate::constants::DEFAULT_TOTAL_RESULT_CAP,
            per_file_limit: crate::constants::DEFAULT_PER_FILE_RESULT_CAP,
            no_cache: false,
        }
    }

    /// Normalize the query into a stable cache-fingerprint string.
    #[must_use]
    pub fn fingerprint_source(&self) -> String {
        format!(
            "{:?}|{}|{:?}|{:?}|{}|{}|{}",
            self.mode,
            self.text.trim().to_lowercase(),
            self.filters.extensions,
            self.filters.include_globs,
            self.limit,
            self.per_file_limit,
            matches!(self.response_mode, ResponseMode::Summary)
        )
    }
}
