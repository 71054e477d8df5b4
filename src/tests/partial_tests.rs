//! Tests for partial pipeline storage

use serde_json::{Map, json};

use super::setup_storage;
use crate::storage::PartialData;

fn sample_data() -> PartialData {
    let mut kwargs = Map::new();
    kwargs.insert("email".to_string(), json!("alice@example.com"));
    PartialData {
        args: vec![json!("pixelpin")],
        kwargs,
    }
}

#[tokio::test]
async fn test_prepare_does_not_persist() {
    let (db, storage) = setup_storage().await;
    let store = storage.partial(&db);

    let partial = store.prepare("pixelpin", 3, sample_data());
    assert_eq!(partial.token.len(), 32);
    assert!(store.load(&partial.token).await.expect("query").is_none());
}

#[tokio::test]
async fn test_store_load_destroy() {
    let (db, storage) = setup_storage().await;
    let store = storage.partial(&db);

    let partial = store.prepare("pixelpin", 3, sample_data());
    store.store(&partial).await.expect("store");

    let loaded = store
        .load(&partial.token)
        .await
        .expect("query")
        .expect("partial should be stored");
    assert_eq!(loaded, partial);

    store.destroy(&partial.token).await.expect("destroy");
    assert!(store.load(&partial.token).await.expect("query").is_none());
}

#[tokio::test]
async fn test_store_replaces_same_token() {
    let (db, storage) = setup_storage().await;
    let store = storage.partial(&db);

    let mut partial = store.prepare("pixelpin", 3, sample_data());
    store.store(&partial).await.expect("store");

    partial.next_step = 4;
    let mut extra = Map::new();
    extra.insert("username".to_string(), json!("alice"));
    partial.data.extend_kwargs(extra);
    store.store(&partial).await.expect("store again");

    let loaded = store
        .load(&partial.token)
        .await
        .expect("query")
        .expect("partial should be stored");
    assert_eq!(loaded.next_step, 4);
    assert_eq!(loaded.data.kwargs.get("username"), Some(&json!("alice")));
    assert_eq!(
        loaded.data.kwargs.get("email"),
        Some(&json!("alice@example.com"))
    );
}
