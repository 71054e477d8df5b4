//! Tests for nonce replay protection

use chrono::Utc;

use super::setup_storage;
use crate::error::PixelpinAuthError;

const SERVER_URL: &str = "https://openid.example.com/server";

#[tokio::test]
async fn test_fresh_nonce_is_accepted_once() {
    let (db, storage) = setup_storage().await;
    let store = storage.nonce(&db);
    let now = Utc::now().timestamp();

    assert!(
        store
            .use_nonce(SERVER_URL, now, "salt-1")
            .await
            .expect("use nonce"),
        "First use should be accepted"
    );
    assert!(
        !store
            .use_nonce(SERVER_URL, now, "salt-1")
            .await
            .expect("use nonce"),
        "Replay should be refused"
    );
    assert!(
        store
            .use_nonce(SERVER_URL, now, "salt-2")
            .await
            .expect("use nonce"),
        "Different salt is a different nonce"
    );
    assert!(
        store
            .use_nonce("https://other.example.com", now, "salt-1")
            .await
            .expect("use nonce"),
        "Nonces are scoped per server"
    );
}

#[tokio::test]
async fn test_nonce_outside_skew_is_refused() {
    let (db, storage) = setup_storage().await;
    let store = storage.nonce(&db);
    let now = Utc::now().timestamp();

    assert!(
        !store
            .use_nonce(SERVER_URL, now - 6 * 3600, "old")
            .await
            .expect("use nonce")
    );
    assert!(
        !store
            .use_nonce(SERVER_URL, now + 6 * 3600, "future")
            .await
            .expect("use nonce")
    );
    assert!(
        store
            .get(SERVER_URL, now - 6 * 3600, "old")
            .await
            .expect("query")
            .is_none(),
        "Refused nonces are not recorded"
    );
}

#[tokio::test]
async fn test_get_and_delete_nonce() {
    let (db, storage) = setup_storage().await;
    let store = storage.nonce(&db);
    let now = Utc::now().timestamp();

    store.use_nonce(SERVER_URL, now, "salt").await.expect("use nonce");
    let entry = store
        .get(SERVER_URL, now, "salt")
        .await
        .expect("query")
        .expect("nonce should be recorded");
    assert_eq!(entry.server_url, SERVER_URL);
    assert_eq!(entry.timestamp, now);

    store.delete(entry.id).await.expect("delete");
    assert!(store.get(SERVER_URL, now, "salt").await.expect("query").is_none());
}

#[tokio::test]
async fn test_nonce_salt_too_long() {
    let (db, storage) = setup_storage().await;
    let err = storage
        .nonce(&db)
        .use_nonce(SERVER_URL, Utc::now().timestamp(), &"s".repeat(41))
        .await
        .expect_err("salt longer than 40 characters");
    assert!(matches!(
        err,
        PixelpinAuthError::FieldTooLong { field: "salt", .. }
    ));
}

#[tokio::test]
async fn test_nonce_extreme_timestamps_are_refused() {
    let (db, storage) = setup_storage().await;
    let store = storage.nonce(&db);
    let now = Utc::now().timestamp();

    for timestamp in [i64::MIN, i64::MIN + now, i64::MAX] {
        assert!(
            !store
                .use_nonce(SERVER_URL, timestamp, "salt")
                .await
                .expect("use nonce"),
            "timestamp {timestamp} is far outside the skew window"
        );
    }
}
