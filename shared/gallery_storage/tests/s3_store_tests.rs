//! `S3ObjectStore` against `LocalStack`
//!
//! Needs `LocalStack` on `http://localhost:4566`:
//! `cargo test -p gallery_storage --test s3_store_tests -- --ignored`

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use aws_sdk_s3::{types::Permission, Client as S3Client};
use bytes::Bytes;
use gallery_storage::{ObjectStore, S3ObjectStore, StorageError, StoreConfig};
use pretty_assertions::assert_eq;

const ALL_USERS: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Creates a fresh bucket and a store connected to it
async fn setup_store() -> (S3ObjectStore, S3Client) {
    // LocalStack accepts any credentials
    if env::var("AWS_ACCESS_KEY_ID").is_err() {
        env::set_var("AWS_ACCESS_KEY_ID", "test");
        env::set_var("AWS_SECRET_ACCESS_KEY", "test");
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let config = StoreConfig::localstack(format!("gallery-test-{nanos}"));

    let client = S3Client::from_conf(config.s3_client_config().await);
    client
        .create_bucket()
        .bucket(&config.bucket)
        .send()
        .await
        .expect("Failed to create test bucket");

    let store = S3ObjectStore::connect(config)
        .await
        .expect("Failed to connect to test bucket");

    (store, client)
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_exists_maps_not_found_to_false() {
    let (store, _client) = setup_store().await;

    assert!(!store.exists("processed/cat/thumbnail.png").await.unwrap());

    store
        .put(
            "processed/cat/thumbnail.png",
            Bytes::from_static(b"thumb"),
            Some("image/png"),
        )
        .await
        .unwrap();

    assert!(store.exists("processed/cat/thumbnail.png").await.unwrap());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_make_public_grants_all_users_read() {
    let (store, client) = setup_store().await;
    store
        .put(
            "processed/cat/original.png",
            Bytes::from_static(b"cat"),
            None,
        )
        .await
        .unwrap();

    store.make_public("processed/cat/original.png").await.unwrap();

    let acl = client
        .get_object_acl()
        .bucket(store.bucket())
        .key("processed/cat/original.png")
        .send()
        .await
        .unwrap();
    let public_read = acl.grants().iter().any(|grant| {
        grant.permission() == Some(&Permission::Read)
            && grant.grantee().and_then(|grantee| grantee.uri()) == Some(ALL_USERS)
    });
    assert!(public_read, "grants: {:?}", acl.grants());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_make_public_missing_object_fails() {
    let (store, _client) = setup_store().await;

    assert!(store.make_public("processed/ghost/original.png").await.is_err());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_get_missing_object_is_not_found() {
    let (store, _client) = setup_store().await;

    let err = store
        .get("uploads/missing.png", u64::MAX)
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_get_refuses_oversized_object() {
    let (store, _client) = setup_store().await;
    store
        .put("uploads/big.png", Bytes::from_static(b"0123456789"), None)
        .await
        .unwrap();

    let err = store.get("uploads/big.png", 4).await.unwrap_err();

    assert!(matches!(
        err,
        StorageError::TooLarge { size: 10, limit: 4, .. }
    ));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_copy_delete_and_list() {
    let (store, _client) = setup_store().await;
    store
        .put("uploads/my cat.png", Bytes::from_static(b"cat"), None)
        .await
        .unwrap();

    store
        .copy("uploads/my cat.png", "processed/my cat/original.png")
        .await
        .unwrap();
    store.delete("uploads/my cat.png").await.unwrap();

    assert_eq!(
        store
            .get("processed/my cat/original.png", u64::MAX)
            .await
            .unwrap(),
        Bytes::from_static(b"cat")
    );
    assert!(!store.exists("uploads/my cat.png").await.unwrap());

    let listed = store.list("processed/").await.unwrap();
    let names: Vec<&str> = listed.iter().map(|object| object.name.as_str()).collect();
    assert_eq!(names, vec!["processed/my cat/original.png"]);
    assert_eq!(listed[0].bucket, store.bucket());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_connect_to_missing_bucket_fails() {
    let (store, _client) = setup_store().await;
    let missing = StoreConfig::localstack(format!("{}-missing", store.bucket()));

    let err = S3ObjectStore::connect(missing).await.err().expect("connect should fail");

    assert!(err.is_not_found(), "unexpected error: {err}");
}
