//! SurrealDB document store: embedded memory and RocksDB engines
//! Run: cargo test -p treasures-server --test surreal_store

use std::sync::Arc;

use serde_json::json;
use shared::ErrorCode;
use treasures_server::db::repository::SettingsRepository;
use treasures_server::db::store::{DocumentStore, StoreError, SurrealDocumentStore};
use treasures_server::message::ChangeBus;

#[tokio::test]
async fn versions_increase_and_conflicts_are_detected() {
    let store = SurrealDocumentStore::in_memory().await.unwrap();

    assert!(store.get("things", "a").await.unwrap().is_none());

    let v1 = store
        .put_versioned("things", "a", json!({ "n": 1 }), 0)
        .await
        .unwrap();
    assert_eq!(v1, 1);

    // creating again with version 0 must fail
    let err = store
        .put_versioned("things", "a", json!({ "n": 99 }), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { expected: 0, actual: 1, .. }));

    let v2 = store
        .put_versioned("things", "a", json!({ "n": 2 }), v1)
        .await
        .unwrap();
    assert_eq!(v2, 2);
    assert_eq!(store.put("things", "a", json!({ "n": 3 })).await.unwrap(), 3);

    let doc = store.get("things", "a").await.unwrap().unwrap();
    assert_eq!(doc.version, 3);
    assert_eq!(doc.body, json!({ "n": 3 }));
}

#[tokio::test]
async fn list_orders_by_field_and_delete_reports_removal() {
    let store = SurrealDocumentStore::in_memory().await.unwrap();
    store
        .batch_put(
            "images",
            vec![
                ("x".to_string(), json!({ "order": 3 })),
                ("y".to_string(), json!({ "order": 1 })),
                ("z".to_string(), json!({ "order": 2 })),
            ],
        )
        .await
        .unwrap();

    let ids: Vec<String> = store
        .list("images", Some("order"))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["y", "z", "x"]);

    assert!(store.delete("images", "y").await.unwrap());
    assert!(!store.delete("images", "y").await.unwrap());
    assert_eq!(store.list("images", None).await.unwrap().len(), 2);
    assert!(store.list("empty", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn nested_bodies_survive_storage() {
    let store = SurrealDocumentStore::in_memory().await.unwrap();
    let body = json!({
        "texts": { "header": { "text": "Hi", "fontSize": 20 } },
        "list": [1, "two", null, { "deep": true }],
    });
    store.put("settings", "main", body.clone()).await.unwrap();
    assert_eq!(store.get("settings", "main").await.unwrap().unwrap().body, body);
    store.ping().await.unwrap();
}

#[tokio::test]
async fn rocksdb_backend_writes_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    let store = SurrealDocumentStore::open(&path).await.unwrap();
    let repo = SettingsRepository::new(Arc::new(store), ChangeBus::new());
    repo.update(&json!({ "autoplaySpeed": 7000 })).await.unwrap();

    assert!(path.exists());
    assert_eq!(repo.get().await.unwrap().autoplay_speed, 7000);
}

#[tokio::test]
async fn settings_conflict_on_surreal() {
    let store = Arc::new(SurrealDocumentStore::in_memory().await.unwrap());
    let repo = SettingsRepository::new(store.clone(), ChangeBus::new());
    let (_, version) = repo.load().await.unwrap();

    repo.update(&json!({ "autoplay": false })).await.unwrap();

    let err = store
        .put_versioned("settings", "main", json!({}), version)
        .await
        .unwrap_err();
    let app_err: shared::AppError = err.into();
    assert_eq!(app_err.code, ErrorCode::AlreadyExists);
}
