//! The `Hit` value object produced by `IndexService::search`.

use serde::{Deserialize, Serialize};

/// A single matched term and the field it was found in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedTerm {
    /// The field the term was matched in (`content`, `content_symbols`, ...).
    pub field: String,
    /// The matched term text.
    pub term: String,
    /// Byte position within `content` the match starts at, if known.
    pub position: Option<usize>,
}

/// A context line surrounding a matched span.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    /// 1-based line number.
    pub line_number: usize,
    /// Line text.
    pub text: String,
    /// Whether this line itself contains a match (vs. surrounding context).
    pub is_match: bool,
}

/// A ranked document plus its matched positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    /// The matched document's canonical path (its id).
    pub document_id: String,
    /// Path relative to the workspace root.
    pub relative_path: String,
    /// Combined relevance score (BM25 + boosts).
    pub score: f32,
    /// Terms matched, per field.
    pub matched_terms: Vec<MatchedTerm>,
    /// Snippet lines surrounding the match, if requested.
    pub context: Vec<ContextLine>,
}
