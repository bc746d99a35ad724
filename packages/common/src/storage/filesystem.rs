use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;
use super::traits::ObjectStore;
use super::validate_key;

/// Filesystem-backed object store for development and tests.
///
/// Objects live at `{root}/{key}`; URLs are formed as `{base_url}/{key}`.
/// Writes go through a temp file and a rename so a reader never observes a
/// partially written object, and a repeated put on the same key overwrites.
pub struct FilesystemObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FilesystemObjectStore {
    pub async fn new(root: PathBuf, base_url: impl Into<String>) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        validate_key(key)?;

        let temp_path = self.temp_path();
        let mut temp_file = fs::File::create(&temp_path).await?;
        if let Err(e) = temp_file.write_all(data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = temp_file.flush().await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        drop(temp_file);

        let object_path = self.object_path(key);
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Rename replaces an existing object atomically, giving overwrite
        // semantics for repeated puts under the same key.
        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(self.object_url(key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        match fs::read(self.object_path(key)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(fs::try_exists(self.object_path(key)).await?)
    }
}
