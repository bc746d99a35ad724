mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use traits::ObjectStore;

/// Validate an object key before handing it to a backend.
///
/// Keys are slash-separated relative paths (`certificates/CERT-....pdf`).
/// Empty keys, absolute paths and parent-directory components are rejected.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".into()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must be relative: {key}"
        )));
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return Err(StorageError::InvalidKey(format!(
            "key contains invalid path component: {key}"
        )));
    }
    Ok(())
}
