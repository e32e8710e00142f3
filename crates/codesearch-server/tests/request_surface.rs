use codesearch_application::Engine;
use codesearch_domain::value_objects::{QueryFilters, ResponseMode, SearchMode};
use codesearch_infrastructure::cache::LruQueryCache;
use codesearch_infrastructure::index::TantivyIndexService;
use codesearch_infrastructure::lock::FsLockManager;
use codesearch_infrastructure::path::PathResolver;
use codesearch_infrastructure::registry::JsonWorkspaceRegistry;
use codesearch_server::api;
use std::fs;
use std::sync::Arc;

fn engine(base: &std::path::Path) -> Engine {
    let resolver = PathResolver::new(base.to_path_buf());
    Engine::new(
        Arc::new(TantivyIndexService::new(resolver.clone())),
        Arc::new(JsonWorkspaceRegistry::open(resolver.clone()).unwrap()),
        Arc::new(LruQueryCache::new(16)),
        Arc::new(FsLockManager::new(resolver)),
    )
}

#[tokio::test]
async fn index_then_search_round_trip_through_envelopes() {
    let base = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    fs::write(workspace.path().join("lib.rs"), "fn get_user_name() -> String { String::new() }").unwrap();

    let engine = engine(base.path());
    let workspace_path = workspace.path().to_str().unwrap();

    let index_envelope = api::index_workspace(&engine, workspace_path, false).await;
    assert!(index_envelope.success);
    assert_eq!(index_envelope.data.unwrap().files_indexed, 1);

    let search_envelope = api::text_search(
        &engine,
        workspace_path,
        "get_user_name",
        SearchMode::Code,
        QueryFilters::default(),
        ResponseMode::Full,
        None,
        true,
    )
    .await;
    assert!(search_envelope.success);
    let data = search_envelope.data.unwrap();
    assert_eq!(data.hits.len(), 1);
    assert_eq!(data.hits[0].relative_path, "lib.rs");
}

#[tokio::test]
async fn search_against_unindexed_workspace_reports_recovery() {
    let base = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();

    let engine = engine(base.path());
    let envelope = api::text_search(
        &engine,
        workspace.path().to_str().unwrap(),
        "anything",
        SearchMode::Auto,
        QueryFilters::default(),
        ResponseMode::Adaptive,
        None,
        false,
    )
    .await;

    // An empty, never-indexed workspace still opens an empty index rather
    // than erroring, so this should succeed with zero hits.
    assert!(envelope.success);
    assert_eq!(envelope.data.unwrap().hits.len(), 0);
}

#[tokio::test]
async fn batch_operations_runs_independently_per_op() {
    let base = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    fs::write(workspace.path().join("a.rs"), "struct Widget;").unwrap();

    let engine = engine(base.path());
    let workspace_path = workspace.path().to_str().unwrap();
    api::index_workspace(&engine, workspace_path, false).await;

    let ops = vec![
        api::BatchOperation::TextSearch {
            workspace_path: Some(workspace_path.to_owned()),
            query: "Widget".to_owned(),
            mode: SearchMode::Auto,
        },
        api::BatchOperation::RecentFiles { workspace_path: Some(workspace_path.to_owned()), since_unix_secs: 0, max_results: 10 },
    ];

    let results = api::batch_operations(&engine, ops, None).await;
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.envelope["success"], serde_json::Value::Bool(true));
    }
}
