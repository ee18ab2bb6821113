//! Error types raised by the JSON file storage implementation.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenient result alias returning [`FileStoreError`] failures.
pub type FileResult<T> = Result<T, FileStoreError>;

/// Failures that can occur while reading or writing the state file.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The state file exists but could not be read.
    #[error("failed to read state file `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing or replacing the state file failed.
    #[error("failed to write state file `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The directory holding the state file could not be created.
    #[error("failed to prepare state directory `{path}`")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The state file does not contain a valid competition document.
    #[error("failed to decode state file `{path}`")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The competition document could not be encoded.
    #[error("failed to encode competition state")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}
