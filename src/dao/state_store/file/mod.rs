mod error;
mod store;

pub use error::FileStoreError;
pub use store::FileStateStore;

use crate::dao::storage::StorageError;

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::Decode { .. } => StorageError::corrupted(err.to_string(), err),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
