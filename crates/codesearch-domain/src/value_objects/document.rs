//! The `Document` value object (spec.md §3, §4.4).

use serde::{Deserialize, Serialize};

/// One source file as seen by the analyzer and indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Canonical absolute path; also the document id.
    pub path: String,
    /// Path relative to the workspace root.
    pub relative_path: String,
    /// File name only.
    pub filename: String,
    /// Extension without the leading dot, lowercased.
    pub extension: String,
    /// Best-effort language classification, derived from `extension`.
    pub language: String,
    /// File size in bytes at the time of reading.
    pub size: u64,
    /// Filesystem modification time, in 100ns ticks since the Unix epoch.
    pub modified_ticks: i64,
    /// Raw UTF-8 content (lossy-decoded); indexed but never stored verbatim.
    pub content: String,
}

impl Document {
    /// Convert a `SystemTime` into the tick representation used by
    /// `modified_ticks` (100ns units, matching .NET's `DateTime.Ticks`
    /// convention that the original system's range queries rely on).
    #[must_use]
    pub fn ticks_from_unix_seconds(unix_seconds: i64, subsec_nanos: u32) -> i64 {
        unix_seconds
            .saturating_mul(10_000_000)
            .saturating_add(i64::from(subsec_nanos) / 100)
    }
}
