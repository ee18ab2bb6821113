mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::{CouchDaoError, DatabaseAction};
pub use store::CouchStateStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::InvalidDocument { .. } | CouchDaoError::MalformedBody { .. } => {
                StorageError::corrupted(err.to_string(), err)
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
