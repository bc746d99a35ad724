pub mod retry;
pub mod storage;

pub use storage::{ObjectStore, StorageError};
