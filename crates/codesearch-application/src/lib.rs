//! Use-case orchestration layer: wires domain ports together to satisfy
//! each request-surface operation, independent of how a caller transports
//! the request (spec.md §6).

pub mod response;
pub mod use_cases;

pub use response::{ResponseBuilder, SearchResponseData};
pub use use_cases::{Engine, HealthReport, IndexWorkspaceOutcome, SimilarFile};
