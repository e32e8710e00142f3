//! Use-case orchestration: wires the domain ports together to satisfy
//! each spec.md §6 request-surface operation. The server layer is a thin
//! façade translating wire requests into calls on [`Engine`].

mod health;
mod index_workspace;
mod search;
mod similar_files;

pub use health::HealthReport;
pub use index_workspace::IndexWorkspaceOutcome;
pub use similar_files::SimilarFile;

use codesearch_domain::ports::{IndexServicePort, LockManagerPort, QueryCachePort, WorkspaceRegistryPort};
use std::sync::Arc;

/// Shared orchestration surface over every domain port.
pub struct Engine {
    pub(crate) index_service: Arc<dyn IndexServicePort>,
    pub(crate) registry: Arc<dyn WorkspaceRegistryPort>,
    pub(crate) cache: Arc<dyn QueryCachePort>,
    pub(crate) lock_manager: Arc<dyn LockManagerPort>,
}

impl Engine {
    /// Build an engine over the given port implementations.
    #[must_use]
    pub fn new(
        index_service: Arc<dyn IndexServicePort>,
        registry: Arc<dyn WorkspaceRegistryPort>,
        cache: Arc<dyn QueryCachePort>,
        lock_manager: Arc<dyn LockManagerPort>,
    ) -> Self {
        Self { index_service, registry, cache, lock_manager }
    }
}

pub(crate) fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
