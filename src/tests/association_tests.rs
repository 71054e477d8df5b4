//! Tests for OpenID association storage

use chrono::Utc;

use super::setup_storage;
use crate::error::PixelpinAuthError;
use crate::storage::OpenIdAssociation;

const SERVER_URL: &str = "https://openid.example.com/server";

fn association(handle: &str, secret: &[u8], issued: i64, lifetime: i64) -> OpenIdAssociation {
    OpenIdAssociation {
        handle: handle.to_string(),
        secret: secret.to_vec(),
        issued,
        lifetime,
        assoc_type: "HMAC-SHA256".to_string(),
    }
}

#[tokio::test]
async fn test_store_is_an_upsert() {
    let (db, storage) = setup_storage().await;
    let store = storage.association(&db);
    let now = Utc::now().timestamp();

    let first = store
        .store(SERVER_URL, &association("handle-1", b"first secret", now, 3600))
        .await
        .expect("store");
    let second = store
        .store(SERVER_URL, &association("handle-1", b"second secret", now + 10, 7200))
        .await
        .expect("store again");
    assert_eq!(first.id, second.id, "Same handle should update in place");

    let stored = store.get(SERVER_URL, Some("handle-1")).await.expect("query");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].lifetime, 7200);
    assert_eq!(
        stored[0].secret_bytes().expect("secret should decode"),
        b"second secret".to_vec()
    );
}

#[tokio::test]
async fn test_get_orders_newest_first() {
    let (db, storage) = setup_storage().await;
    let store = storage.association(&db);
    let now = Utc::now().timestamp();

    store
        .store(SERVER_URL, &association("older", b"a", now - 100, 3600))
        .await
        .expect("store");
    store
        .store(SERVER_URL, &association("newer", b"b", now, 3600))
        .await
        .expect("store");
    store
        .store("https://elsewhere.example.com", &association("other", b"c", now, 3600))
        .await
        .expect("store");

    let handles: Vec<_> = store
        .get(SERVER_URL, None)
        .await
        .expect("query")
        .into_iter()
        .map(|assoc| assoc.handle)
        .collect();
    assert_eq!(handles, vec!["newer".to_string(), "older".to_string()]);
}

#[tokio::test]
async fn test_get_valid_drops_expired() {
    let (db, storage) = setup_storage().await;
    let store = storage.association(&db);
    let now = Utc::now().timestamp();

    store
        .store(SERVER_URL, &association("expired", b"old", now - 7200, 3600))
        .await
        .expect("store");
    store
        .store(SERVER_URL, &association("current", b"new", now - 60, 3600))
        .await
        .expect("store");

    let valid = store
        .get_valid(SERVER_URL, None)
        .await
        .expect("query")
        .expect("a valid association exists");
    assert_eq!(valid.handle, "current");
    assert_eq!(valid.secret, b"new".to_vec());

    let remaining = store.get(SERVER_URL, None).await.expect("query");
    assert_eq!(remaining.len(), 1, "Expired association should be removed");

    assert!(
        store
            .get_valid(SERVER_URL, Some("expired"))
            .await
            .expect("query")
            .is_none()
    );
}

#[tokio::test]
async fn test_remove_associations() {
    let (db, storage) = setup_storage().await;
    let store = storage.association(&db);
    let now = Utc::now().timestamp();

    let a = store
        .store(SERVER_URL, &association("a", b"a", now, 3600))
        .await
        .expect("store");
    store
        .store(SERVER_URL, &association("b", b"b", now, 3600))
        .await
        .expect("store");

    assert_eq!(store.remove(vec![]).await.expect("remove nothing"), 0);
    assert_eq!(store.remove(vec![a.id]).await.expect("remove"), 1);
    let remaining = store.get(SERVER_URL, None).await.expect("query");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].handle, "b");
}

#[tokio::test]
async fn test_secret_too_long_for_column() {
    let (db, storage) = setup_storage().await;
    let store = storage.association(&db);
    let now = Utc::now().timestamp();

    // 191 bytes encode to 256 base64 characters
    let err = store
        .store(SERVER_URL, &association("big", &[7u8; 191], now, 3600))
        .await
        .expect_err("encoded secret exceeds the column");
    assert!(matches!(
        err,
        PixelpinAuthError::FieldTooLong {
            field: "secret",
            length: 256,
            max: 255
        }
    ));
    assert!(store.get(SERVER_URL, Some("big")).await.expect("query").is_empty());

    store
        .store(SERVER_URL, &association("fits", &[7u8; 189], now, 3600))
        .await
        .expect("189 bytes encode to 252 characters");
}
