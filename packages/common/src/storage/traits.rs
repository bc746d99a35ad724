use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed object storage.
///
/// Writes are idempotent: putting the same key twice overwrites the object
/// rather than creating a duplicate. Each call performs exactly one attempt;
/// retry and timeout policy belongs to the caller.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key` and return a stable, durable URL.
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Retrieve all bytes for an object by its key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
