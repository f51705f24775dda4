use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::StorageResult;

/// Bucket used when no override is configured
pub const DEFAULT_BUCKET: &str = "scaler-attempt-bucket";

/// Namespace that receives raw uploads
pub const UPLOADS_PREFIX: &str = "uploads/";

/// Namespace that holds published originals and thumbnails
pub const PROCESSED_PREFIX: &str = "processed/";

/// Snapshot of one object returned by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Full object key
    pub name: String,
    /// Bucket that holds the object
    pub bucket: String,
    /// Direct link to the object's media
    pub media_url: Url,
}

/// Bucket-scoped object store
///
/// Implementations are expected to give read-after-write consistency per key. Retries and
/// backoff, if any, belong to the implementation and never to its callers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket every operation targets
    fn bucket(&self) -> &str;

    /// Checks whether an object exists
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attributes lookup fails for any reason other than not-found
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Reads the full body of an object no larger than `max_bytes`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist, or
    /// `StorageError::TooLarge` if its body exceeds `max_bytes`
    async fn get(&self, key: &str, max_bytes: u64) -> StorageResult<Bytes>;

    /// Writes an object, replacing any previous body
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails
    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> StorageResult<()>;

    /// Copies an object to another key in the same bucket
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the source is missing or the copy fails
    async fn copy(&self, source: &str, destination: &str) -> StorageResult<()>;

    /// Deletes an object
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Grants public read access to an object
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the ACL update fails
    async fn make_public(&self, key: &str) -> StorageResult<()>;

    /// Lists every object whose key starts with `prefix`, in store order
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any page of the listing fails
    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>>;
}
