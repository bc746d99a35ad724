use std::fmt;
use std::time::Duration;

/// Errors that can occur during object storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested object was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The provided object key is invalid.
    InvalidKey(String),
    /// The remote store rejected the write with a non-success status.
    Upload { status: u16, message: String },
    /// The provider client failed before a status was available.
    Provider(String),
    /// The operation did not complete within the caller's deadline.
    Timeout(Duration),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidKey(msg) => write!(f, "invalid object key: {msg}"),
            Self::Upload { status, message } => {
                write!(f, "upload rejected with status {status}: {message}")
            }
            Self::Provider(msg) => write!(f, "storage provider error: {msg}"),
            Self::Timeout(d) => write!(f, "storage operation timed out after {d:?}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
