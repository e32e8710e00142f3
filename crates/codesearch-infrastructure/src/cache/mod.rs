//! Bounded query-result cache (spec.md §4.10): entries are keyed by a
//! caller-supplied fingerprint and invalidated once the index's commit
//! generation advances past the generation they were computed against.

use async_trait::async_trait;
use codesearch_domain::ports::{CachedValue, QueryCachePort};
use codesearch_domain::value_objects::CommitGeneration;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// `lru`-backed implementation of [`QueryCachePort`].
pub struct LruQueryCache {
    entries: Mutex<LruCache<String, CachedValue>>,
}

impl LruQueryCache {
    /// Build a cache holding up to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        Self { entries: Mutex::new(LruCache::new(capacity)) }
    }
}

#[async_trait]
impl QueryCachePort for LruQueryCache {
    async fn get(&self, key: &str, current_generation: CommitGeneration) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(cached) if cached.generation == current_generation => Some(cached.payload.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: String, value: CachedValue) {
        self.entries.lock().put(key, value);
    }

    async fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_returns_payload_for_current_generation() {
        let cache = LruQueryCache::new(4);
        cache
            .put(
                "q1".to_owned(),
                CachedValue { payload: serde_json::json!({"hits": []}), generation: CommitGeneration(3) },
            )
            .await;
        assert!(cache.get("q1", CommitGeneration(3)).await.is_some());
    }

    #[tokio::test]
    async fn stale_generation_is_evicted_on_read() {
        let cache = LruQueryCache::new(4);
        cache
            .put("q1".to_owned(), CachedValue { payload: serde_json::json!({}), generation: CommitGeneration(1) })
            .await;
        assert!(cache.get("q1", CommitGeneration(2)).await.is_none());
        assert!(cache.get("q1", CommitGeneration(1)).await.is_none());
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = LruQueryCache::new(1);
        cache
            .put("a".to_owned(), CachedValue { payload: serde_json::json!(1), generation: CommitGeneration(0) })
            .await;
        cache
            .put("b".to_owned(), CachedValue { payload: serde_json::json!(2), generation: CommitGeneration(0) })
            .await;
        assert!(cache.get("a", CommitGeneration(0)).await.is_none());
        assert!(cache.get("b", CommitGeneration(0)).await.is_some());
    }
}
