//! The uniform response envelope (spec.md §6): every request-surface
//! function returns one of these regardless of which operation ran, so a
//! caller can branch on `success` without knowing the operation's shape.

use codesearch_domain::error::Error;
use codesearch_domain::value_objects::ResponseMode;
use serde::Serialize;

/// `{code, message}` pair surfaced on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeError {
    /// Machine-readable error code (see [`Error::code`]).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Actionable follow-up surfaced alongside a failure.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recovery {
    /// Ordered remediation steps a caller can narrate to a user.
    pub steps: Vec<String>,
    /// Machine-actionable follow-up calls (operation names).
    pub suggested_actions: Vec<String>,
}

/// Counts, timing, and paging information common to every response.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Total matches/items before any cap was applied.
    pub total_count: usize,
    /// Items actually included in `data`.
    pub returned_count: usize,
    /// Wall-clock duration of the operation.
    pub duration_ms: u64,
    /// Rough token count of the serialized `data`, if computed.
    pub estimated_tokens: Option<usize>,
    /// Whether `data` is a subset of all matches.
    pub truncated: bool,
    /// Opaque token a follow-up call can pass to fetch the next page.
    pub detail_request_token: Option<String>,
}

/// The uniform envelope every request-surface function returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    /// Whether the operation completed without error.
    pub success: bool,
    /// The response-shaping mode actually used.
    pub mode: ResponseMode,
    /// Serialization format identifier, currently always `"json"`.
    pub format: &'static str,
    /// The operation's payload, absent on failure.
    pub data: Option<T>,
    /// An optional short human-facing rendering of `data`.
    pub display: Option<String>,
    /// Counts, timing, and paging metadata.
    pub metadata: Metadata,
    /// Populated when `success` is `false`.
    pub error: Option<EnvelopeError>,
    /// Populated when `success` is `false`.
    pub recovery: Option<Recovery>,
}

impl<T: Serialize> Envelope<T> {
    /// Build a successful envelope.
    #[must_use]
    pub fn ok(data: T, mode: ResponseMode, metadata: Metadata) -> Self {
        Self { success: true, mode, format: "json", data: Some(data), display: None, metadata, error: None, recovery: None }
    }

    /// Build a failing envelope from a domain error, attaching the
    /// operation-appropriate recovery hint.
    #[must_use]
    pub fn err(error: &Error, mode: ResponseMode) -> Self {
        Self {
            success: false,
            mode,
            format: "json",
            data: None,
            display: None,
            metadata: Metadata::default(),
            error: Some(EnvelopeError { code: error.code().to_owned(), message: error.to_string() }),
            recovery: Some(crate::error_mapping::recovery_for(error)),
        }
    }
}
