//! Port for the bounded query-result cache (spec.md §4.10).

use async_trait::async_trait;

use crate::value_objects::CommitGeneration;

/// A cached value plus the commit generation it was computed against.
#[derive(Debug, Clone)]
pub struct CachedValue {
    /// Opaque, pre-serialized response payload.
    pub payload: serde_json::Value,
    /// The generation `payload` was computed against.
    pub generation: CommitGeneration,
}

/// Bounded LRU over materialized query responses.
#[async_trait]
pub trait QueryCachePort: Send + Sync {
    /// Look up `key`, returning `None` on a miss or if the caller's
    /// current generation has advanced past the cached one.
    async fn get(&self, key: &str, current_generation: CommitGeneration) -> Option<serde_json::Value>;

    /// Insert or replace the value for `key`.
    async fn put(&self, key: String, value: CachedValue);

    /// Drop every entry (e.g. on explicit cache-bust).
    async fn clear(&self);
}
