//! Error taxonomy for the search engine.
//!
//! Every variant is grouped under one of the five kinds from the error
//! handling design: Input, Resource, State, Transient, Internal. Each
//! carries a short machine-readable [`Error::code`] and a human message;
//! wrappers annotate with `#[source]` rather than discarding the cause.

use thiserror::Error;

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the search engine.
#[derive(Error, Debug)]
pub enum Error {
    // ---- Input ----
    /// A workspace or index path failed canonicalization or validation.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The path that was rejected.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A glob or regex pattern failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// Compiler error message.
        message: String,
    },

    /// A regex query was rejected for being too expensive to evaluate.
    #[error("query too complex: {message}")]
    QueryTooComplex {
        /// Description of why the query was rejected.
        message: String,
    },

    /// A numeric parameter fell outside its accepted range.
    #[error("parameter '{name}' out of range: {message}")]
    ParameterOutOfRange {
        /// The parameter name.
        name: String,
        /// Description of the valid range.
        message: String,
    },

    // ---- Resource ----
    /// The requested path does not exist on disk.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// The process lacks permission to read or write a path.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: String,
    },

    /// An I/O operation failed with no further context attached.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An I/O operation failed for a specific, named reason.
    #[error("I/O error: {message}")]
    IoContext {
        /// Description of the failed operation.
        message: String,
        /// Optional underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A configured resource budget (memory, queue) was exceeded.
    #[error("over budget: {message}")]
    OverBudget {
        /// Description of the exceeded budget.
        message: String,
    },

    // ---- State ----
    /// The workspace index is held by another writer.
    #[error("index locked by another writer")]
    IndexLocked,

    /// The on-disk index failed consistency checks.
    #[error("index corrupt: {message}")]
    IndexCorrupt {
        /// Description of the corruption detected.
        message: String,
    },

    /// The workspace has never been indexed.
    #[error("workspace not indexed: {workspace}")]
    WorkspaceNotIndexed {
        /// The workspace path or id.
        workspace: String,
    },

    /// The circuit breaker for a workspace is open.
    #[error("circuit breaker open for workspace '{workspace}', retry after {retry_after_secs}s")]
    BreakerOpen {
        /// The workspace the breaker is protecting.
        workspace: String,
        /// Seconds until a half-open probe is allowed.
        retry_after_secs: u64,
    },

    /// The on-disk registry failed to parse and had to be rebuilt.
    #[error("registry corrupt, rebuilt from filesystem scan")]
    RegistryCorrupt,

    // ---- Transient ----
    /// An operation exceeded its deadline.
    #[error("operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The target file was momentarily busy (e.g. mid atomic-write).
    #[error("file busy: {path}")]
    FileBusy {
        /// The path that was busy.
        path: String,
    },

    // ---- Internal ----
    /// An invariant the engine depends on was violated; this is a bug.
    #[error("internal invariant violated: {message}")]
    Invariant {
        /// Description of the violated invariant.
        message: String,
    },

    /// JSON (de)serialization failure, typically on the registry file.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Machine-readable error code surfaced in the response envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "InvalidPath",
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::QueryTooComplex { .. } => "TooManyResults",
            Self::ParameterOutOfRange { .. } => "ParameterOutOfRange",
            Self::NotFound { .. } => "NotFound",
            Self::PermissionDenied { .. } => "PermissionDenied",
            Self::Io { .. } | Self::IoContext { .. } => "IOError",
            Self::OverBudget { .. } => "OverBudget",
            Self::IndexLocked => "IndexLocked",
            Self::IndexCorrupt { .. } => "IndexCorrupt",
            Self::WorkspaceNotIndexed { .. } => "WorkspaceNotIndexed",
            Self::BreakerOpen { .. } => "BreakerOpen",
            Self::RegistryCorrupt => "RegistryCorrupt",
            Self::Timeout { .. } => "Timeout",
            Self::Cancelled => "Cancelled",
            Self::FileBusy { .. } => "FileBusy",
            Self::Invariant { .. } => "Invariant",
            Self::Json { .. } => "JsonError",
        }
    }

    /// Whether a caller should retry this error with backoff.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled | Self::FileBusy { .. })
    }
}
