//! Object storage abstraction.
//!
//! Handlers talk to S3 through the [`ObjectStore`] trait so tests can
//! substitute the in-memory backend.

#[cfg(test)]
mod memory;
mod s3;

#[cfg(test)]
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StorageError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download an object.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Upload an object, replacing any previous content.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str)
    -> Result<(), StorageError>;

    /// List every key starting with `prefix`. An empty listing is not an error.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Pre-signed URL allowing a single PUT of `key` with `content_type`.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Bucket name, for logging.
    fn bucket(&self) -> &str;
}

/// Whether any object is stored under `folder`.
pub async fn folder_in_use(store: &dyn ObjectStore, folder: &str) -> Result<bool, StorageError> {
    let prefix = format!("{}/", folder.trim_end_matches('/'));
    Ok(!store.list(&prefix).await?.is_empty())
}

/// Delete every object under `prefix`, then the prefix marker itself.
/// Returns the number of objects removed besides the marker.
pub async fn remove_folder(store: &dyn ObjectStore, prefix: &str) -> Result<usize, StorageError> {
    let keys = store.list(prefix).await?;
    let mut removed = 0;
    for key in keys.iter().filter(|k| k.as_str() != prefix) {
        store.delete(key).await?;
        removed += 1;
    }
    store.delete(prefix).await?;
    Ok(removed)
}
