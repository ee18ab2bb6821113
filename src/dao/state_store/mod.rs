#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod file;

use crate::dao::models::CompetitionEntity;
use crate::dao::storage::StorageResult;
use futures::{future::BoxFuture, stream::BoxStream};

/// Abstraction over the persistence layer holding the competition document.
pub trait StateStore: Send + Sync {
    /// Read the stored document; `None` when nothing was saved yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>>;
    /// Overwrite the stored document.
    fn save(&self, state: CompetitionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Stream of documents written by other clients; revisions saved through
    /// this store are not echoed back. Dropping the stream unsubscribes.
    /// Backends without change notification return an empty stream.
    fn changes(&self) -> BoxStream<'static, StorageResult<CompetitionEntity>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
