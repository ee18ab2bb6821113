use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_stream::try_stream;
use futures::{Stream, StreamExt, future::BoxFuture, stream::BoxStream};
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::debug;

use crate::dao::{
    models::CompetitionEntity,
    state_store::StateStore,
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult, DatabaseAction},
    models::{ChangesResponse, CouchStateDocument, PutResponse, STATE_DOC_ID, sequence_param},
};

const CHANGES: &str = "_changes";
/// How long CouchDB holds a long-poll request open when nothing changes.
const LONGPOLL_TIMEOUT_MS: u32 = 30_000;
const SAVE_ATTEMPTS: usize = 2;
const OWN_REVISIONS_KEPT: usize = 16;

/// Hosted store keeping the competition in one CouchDB document and
/// following the database `_changes` feed for updates made by other clients.
#[derive(Clone)]
pub struct CouchStateStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
    own_revisions: Arc<Mutex<OwnRevisions>>,
}

/// Recent `_rev`s of the state document written by this process, oldest first.
#[derive(Debug, Default)]
struct OwnRevisions(VecDeque<String>);

impl OwnRevisions {
    fn remember(&mut self, rev: String) {
        if self.0.len() == OWN_REVISIONS_KEPT {
            self.0.pop_front();
        }
        self.0.push_back(rev);
    }

    fn contains(&self, rev: &str) -> bool {
        self.0.iter().any(|own| own == rev)
    }
}

impl CouchStateStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(CouchDaoError::Client)?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
            own_revisions: Arc::default(),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Database {
                database: database.clone(),
                action: DatabaseAction::Lookup,
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::Database {
                        database: database.clone(),
                        action: DatabaseAction::Create,
                        source,
                    })?;
                // 412: created concurrently by another instance.
                if create.status().is_success() || create.status() == StatusCode::PRECONDITION_FAILED
                {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                endpoint: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::MalformedBody {
                        endpoint: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::UnexpectedStatus {
                endpoint: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<reqwest::Response>
    where
        T: ?Sized + Serialize,
    {
        self.request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                endpoint: doc_id.to_string(),
                source,
            })
    }

    /// Upsert the state document. A revision conflict means another client
    /// wrote in between; the latest revision is fetched and the write retried
    /// so the last writer wins. The new `_rev` is remembered so the change
    /// feed can skip this write.
    async fn save_state(&self, state: CompetitionEntity) -> CouchResult<()> {
        for attempt in 0..SAVE_ATTEMPTS {
            let rev = self
                .get_document::<CouchStateDocument>(STATE_DOC_ID)
                .await?
                .and_then(|existing| existing.rev);
            let doc = CouchStateDocument::from((state.clone(), rev));

            let response = self.put_document(STATE_DOC_ID, &doc).await?;
            match response.status() {
                status if status.is_success() => {
                    let written = response.json::<PutResponse>().await.map_err(|source| {
                        CouchDaoError::MalformedBody {
                            endpoint: STATE_DOC_ID.to_string(),
                            source,
                        }
                    })?;
                    self.remember_revision(written.rev);
                    return Ok(());
                }
                StatusCode::CONFLICT => {
                    debug!(attempt, "state document revision conflict; retrying");
                }
                status => {
                    return Err(CouchDaoError::UnexpectedStatus {
                        endpoint: STATE_DOC_ID.to_string(),
                        status,
                    });
                }
            }
        }

        Err(CouchDaoError::RevisionConflict {
            doc_id: STATE_DOC_ID,
            attempts: SAVE_ATTEMPTS,
        })
    }

    fn remember_revision(&self, rev: String) {
        self.own_revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remember(rev);
    }

    fn wrote_revision(&self, rev: &str) -> bool {
        self.own_revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(rev)
    }

    /// Wait for the next batch of changes to the state document after `since`.
    async fn poll_changes(&self, since: &str) -> CouchResult<ChangesResponse> {
        let doc_ids = format!("[\"{STATE_DOC_ID}\"]");
        let query = [
            ("feed", "longpoll".to_string()),
            ("since", since.to_string()),
            ("include_docs", "true".to_string()),
            ("filter", "_doc_ids".to_string()),
            ("doc_ids", doc_ids),
            ("timeout", LONGPOLL_TIMEOUT_MS.to_string()),
        ];

        let response = self
            .request(Method::GET, CHANGES)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                endpoint: CHANGES.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::UnexpectedStatus {
                endpoint: CHANGES.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<ChangesResponse>()
            .await
            .map_err(|source| CouchDaoError::MalformedBody {
                endpoint: CHANGES.to_string(),
                source,
            })
    }
}

/// Follow the `_changes` feed from "now", yielding new revisions of the state
/// document written by other clients. The stream ends with the first error.
fn change_feed(store: CouchStateStore) -> impl Stream<Item = StorageResult<CompetitionEntity>> {
    try_stream! {
        let mut since = String::from("now");
        loop {
            let batch = store.poll_changes(&since).await.map_err(StorageError::from)?;
            for row in batch.results {
                if row.deleted || row.id != STATE_DOC_ID {
                    continue;
                }
                let Some(doc) = row.doc else {
                    continue;
                };
                let document = from_value::<CouchStateDocument>(doc).map_err(|source| {
                    StorageError::from(CouchDaoError::InvalidDocument {
                        endpoint: CHANGES.to_string(),
                        source,
                    })
                })?;
                if document.rev.as_deref().is_some_and(|rev| store.wrote_revision(rev)) {
                    debug!(rev = ?document.rev, "skipping own state document write");
                    continue;
                }
                yield CompetitionEntity::from(document);
            }
            since = sequence_param(&batch.last_seq);
        }
    }
}

impl StateStore for CouchStateStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe_doc = store
                .get_document::<CouchStateDocument>(STATE_DOC_ID)
                .await?;
            Ok(maybe_doc.map(Into::into))
        })
    }

    fn save(&self, state: CompetitionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_state(state).await.map_err(Into::into) })
    }

    fn changes(&self) -> BoxStream<'static, StorageResult<CompetitionEntity>> {
        change_feed(self.clone()).boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::Transport {
                    endpoint: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::UnexpectedStatus {
                    endpoint: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_revisions_keep_the_most_recent_writes() {
        let mut own = OwnRevisions::default();
        for n in 0..=OWN_REVISIONS_KEPT {
            own.remember(format!("{n}-abc"));
        }
        assert!(!own.contains("0-abc"));
        assert!(own.contains("1-abc"));
        assert!(own.contains(&format!("{OWN_REVISIONS_KEPT}-abc")));
        assert!(!own.contains("99-xyz"));
    }

    #[test]
    fn saved_revisions_are_recognised_by_every_clone() {
        let store = CouchStateStore {
            client: Client::new(),
            base_url: Arc::from("http://localhost:5984"),
            database: Arc::from("golf_comp"),
            auth: None,
            own_revisions: Arc::default(),
        };
        let feed_side = store.clone();

        store.remember_revision("2-f00".into());
        assert!(feed_side.wrote_revision("2-f00"));
        assert!(!feed_side.wrote_revision("3-bar"));
    }
}
