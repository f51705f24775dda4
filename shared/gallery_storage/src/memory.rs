//! In-memory object store for tests
//!
//! Keeps objects in a sorted map, records every call in an operation log and can be told to fail
//! a given operation for keys under a prefix.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{ObjectStore, StorageError, StorageResult, StoredObject};

const MEDIA_BASE: &str = "http://localhost:4566";

/// Store operations that can be logged and failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    /// Existence check
    Exists,
    /// Object read
    Get,
    /// Object write
    Put,
    /// Copy, matched against the destination key
    Copy,
    /// Object delete
    Delete,
    /// Public-read ACL update
    MakePublic,
    /// Prefix listing, matched against the prefix
    List,
}

impl StoreOperation {
    /// Whether the operation changes the store's contents or ACLs
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::Put | Self::Copy | Self::Delete | Self::MakePublic
        )
    }
}

#[derive(Debug, Clone)]
struct MemoryObject {
    body: Bytes,
    content_type: Option<String>,
    public: bool,
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<String, MemoryObject>,
    failures: Vec<(StoreOperation, String)>,
    log: Vec<(StoreOperation, String)>,
}

/// Object store held entirely in memory
#[derive(Debug)]
pub struct MemoryObjectStore {
    bucket: String,
    state: Mutex<State>,
}

impl MemoryObjectStore {
    /// Creates an empty store for `bucket`
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds an object without touching the operation log
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Bytes>) {
        self.state().objects.insert(
            key.into(),
            MemoryObject {
                body: body.into(),
                content_type: None,
                public: false,
            },
        );
    }

    /// Makes `operation` fail for every key starting with `key_prefix`
    pub fn fail(&self, operation: StoreOperation, key_prefix: impl Into<String>) {
        self.state().failures.push((operation, key_prefix.into()));
    }

    /// Removes every injected failure
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Whether an object exists
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.state().objects.contains_key(key)
    }

    /// Body of an object
    #[must_use]
    pub fn body(&self, key: &str) -> Option<Bytes> {
        self.state().objects.get(key).map(|object| object.body.clone())
    }

    /// Content type recorded for an object
    #[must_use]
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.state()
            .objects
            .get(key)
            .and_then(|object| object.content_type.clone())
    }

    /// Whether an object is publicly readable, `None` if it does not exist
    #[must_use]
    pub fn is_public(&self, key: &str) -> Option<bool> {
        self.state().objects.get(key).map(|object| object.public)
    }

    /// All keys in lexicographic order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.state().objects.keys().cloned().collect()
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn operations(&self) -> Vec<(StoreOperation, String)> {
        self.state().log.clone()
    }

    /// Calls that changed contents or ACLs
    #[must_use]
    pub fn mutations(&self) -> Vec<(StoreOperation, String)> {
        self.operations()
            .into_iter()
            .filter(|(operation, _)| operation.is_mutation())
            .collect()
    }

    /// Logs the call and returns the injected failure for it, if any
    fn record(&self, operation: StoreOperation, key: &str) -> StorageResult<MutexGuard<'_, State>> {
        let mut state = self.state();
        state.log.push((operation, key.to_string()));

        let injected = state
            .failures
            .iter()
            .any(|(failing, prefix)| *failing == operation && key.starts_with(prefix.as_str()));

        if injected {
            return Err(StorageError::UpstreamError(format!(
                "injected {operation:?} failure for {key}"
            )));
        }

        Ok(state)
    }

    fn media_url(&self, key: &str) -> StorageResult<Url> {
        let link = format!("{MEDIA_BASE}/{}/{key}", self.bucket);
        Url::parse(&link).map_err(|err| StorageError::InvalidMediaLink {
            link,
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let state = self.record(StoreOperation::Exists, key)?;
        Ok(state.objects.contains_key(key))
    }

    async fn get(&self, key: &str, max_bytes: u64) -> StorageResult<Bytes> {
        let state = self.record(StoreOperation::Get, key)?;
        let body = state
            .objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        let size = body.len() as u64;
        if size > max_bytes {
            return Err(StorageError::TooLarge {
                key: key.to_string(),
                size,
                limit: max_bytes,
            });
        }

        Ok(body)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> StorageResult<()> {
        let mut state = self.record(StoreOperation::Put, key)?;
        state.objects.insert(
            key.to_string(),
            MemoryObject {
                body,
                content_type: content_type.map(ToString::to_string),
                public: false,
            },
        );
        Ok(())
    }

    async fn copy(&self, source: &str, destination: &str) -> StorageResult<()> {
        let mut state = self.record(StoreOperation::Copy, destination)?;
        let mut object = state
            .objects
            .get(source)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(source.to_string()))?;
        object.public = false;
        state.objects.insert(destination.to_string(), object);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut state = self.record(StoreOperation::Delete, key)?;
        state.objects.remove(key);
        Ok(())
    }

    async fn make_public(&self, key: &str) -> StorageResult<()> {
        let mut state = self.record(StoreOperation::MakePublic, key)?;
        let object = state
            .objects
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        object.public = true;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        let names: Vec<String> = {
            let state = self.record(StoreOperation::List, prefix)?;
            state
                .objects
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect()
        };

        names
            .into_iter()
            .map(|name| {
                Ok(StoredObject {
                    media_url: self.media_url(&name)?,
                    bucket: self.bucket.clone(),
                    name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_then_delete_moves_object() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("uploads/a.png", "png-bytes");

        store.copy("uploads/a.png", "processed/a/original.png").await.unwrap();
        store.delete("uploads/a.png").await.unwrap();

        assert_eq!(store.keys(), vec!["processed/a/original.png".to_string()]);
        assert_eq!(
            store.body("processed/a/original.png"),
            Some(Bytes::from_static(b"png-bytes"))
        );
    }

    #[tokio::test]
    async fn test_injected_failure_matches_prefix_and_operation() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("processed/a/original.png", "x");
        store.fail(StoreOperation::MakePublic, "processed/a/");

        assert!(store.make_public("processed/a/original.png").await.is_err());
        assert!(store.exists("processed/a/original.png").await.unwrap());
        assert_eq!(store.is_public("processed/a/original.png"), Some(false));

        store.clear_failures();
        store.make_public("processed/a/original.png").await.unwrap();
        assert_eq!(store.is_public("processed/a/original.png"), Some(true));
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix_and_logs_calls() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("processed/a/original.png", "x");
        store.insert("uploads/b.png", "y");

        let listed = store.list("processed/").await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].bucket, "gallery");
        assert_eq!(
            listed[0].media_url.as_str(),
            "http://localhost:4566/gallery/processed/a/original.png"
        );
        assert!(store.mutations().is_empty());
        assert_eq!(
            store.operations(),
            vec![(StoreOperation::List, "processed/".to_string())]
        );
    }

    #[tokio::test]
    async fn test_get_missing_object_is_not_found() {
        let store = MemoryObjectStore::new("gallery");

        let err = store.get("uploads/missing.png", u64::MAX).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_refuses_body_over_limit() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("uploads/big.png", "0123456789");

        let err = store.get("uploads/big.png", 9).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::TooLarge { size: 10, limit: 9, .. }
        ));

        let body = store.get("uploads/big.png", 10).await.unwrap();
        assert_eq!(body.len(), 10);
    }
}
