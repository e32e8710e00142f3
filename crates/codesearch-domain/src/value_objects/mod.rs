//! Immutable value objects shared across layers.

mod document;
mod hit;
mod ids;
mod pending_change;
mod query;
mod registry;
mod workspace;

pub use document::Document;
pub use hit::{ContextLine, Hit, MatchedTerm};
pub use ids::{CommitGeneration, WorkspaceHash};
pub use pending_change::{ChangeKind, PendingChange};
pub use query::{Query, QueryFilters, ResponseMode, SearchMode};
pub use registry::{OrphanReason, OrphanedIndex, Registry, RegistryStatistics};
pub use workspace::{IndexHandleState, Workspace, WorkspaceStatus};
