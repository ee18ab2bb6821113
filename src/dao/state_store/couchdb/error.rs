//! Failures of the CouchDB-backed competition document store.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB store operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Step of database preparation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseAction {
    /// Existence check on the database root.
    Lookup,
    /// Creation of a missing database.
    Create,
}

impl fmt::Display for DatabaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseAction::Lookup => f.write_str("looked up"),
            DatabaseAction::Create => f.write_str("created"),
        }
    }
}

/// What went wrong while reading, writing or following the competition document.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// The store is selected but a required variable is unset.
    #[error("CouchDB store is not configured: `{var}` is unset")]
    MissingEnvVar { var: &'static str },
    #[error("could not build the HTTP client for CouchDB")]
    Client(#[source] reqwest::Error),
    /// The database holding the competition could not be reached or created.
    #[error("CouchDB database `{database}` could not be {action}")]
    Database {
        database: String,
        action: DatabaseAction,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} while preparing database `{database}`")]
    DatabaseStatus { database: String, status: StatusCode },
    /// Transport failure on the state document, the change feed or the database root.
    #[error("request to CouchDB `{endpoint}` failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} on `{endpoint}`")]
    UnexpectedStatus { endpoint: String, status: StatusCode },
    /// Every save lost the race for the latest document revision.
    #[error("state document `{doc_id}` kept changing; gave up after {attempts} save attempts")]
    RevisionConflict { doc_id: &'static str, attempts: usize },
    /// A response body was not the JSON CouchDB is expected to send.
    #[error("CouchDB body from `{endpoint}` is not valid JSON")]
    MalformedBody {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The stored document does not describe a competition.
    #[error("`{endpoint}` does not hold a valid competition document")]
    InvalidDocument {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}
