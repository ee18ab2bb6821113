use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::{StreamExt, future::BoxFuture, stream::BoxStream};
use tokio::fs;
use tracing::debug;

use crate::dao::{
    models::CompetitionEntity,
    state_store::StateStore,
    storage::{StorageError, StorageResult},
};

use super::error::{FileResult, FileStoreError};

/// Durable local storage keeping the competition document in one JSON file.
#[derive(Clone)]
pub struct FileStateStore {
    path: Arc<Path>,
}

impl FileStateStore {
    /// Open the store at `path`, creating the parent directory when needed.
    pub async fn open(path: impl Into<PathBuf>) -> FileResult<Self> {
        let path: PathBuf = path.into();
        let store = Self {
            path: Arc::from(path),
        };
        store.ensure_directory().await?;
        Ok(store)
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn ensure_directory(&self) -> FileResult<()> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        fs::create_dir_all(parent)
            .await
            .map_err(|source| FileStoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })
    }

    async fn read(&self) -> FileResult<Option<CompetitionEntity>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(FileStoreError::Read {
                    path: self.path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| FileStoreError::Decode {
                path: self.path.to_path_buf(),
                source,
            })
    }

    /// Write through a sibling temp file so readers never see a partial document.
    async fn write(&self, state: &CompetitionEntity) -> FileResult<()> {
        let payload =
            serde_json::to_vec_pretty(state).map_err(|source| FileStoreError::Encode { source })?;

        let temp = self.temp_path();
        fs::write(&temp, payload)
            .await
            .map_err(|source| FileStoreError::Write {
                path: temp.clone(),
                source,
            })?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|source| FileStoreError::Write {
                path: self.path.to_path_buf(),
                source,
            })?;

        debug!(path = %self.path.display(), "competition state written");
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read().await.map_err(Into::into) })
    }

    fn save(&self, state: CompetitionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(&state).await.map_err(Into::into) })
    }

    fn changes(&self) -> BoxStream<'static, StorageResult<CompetitionEntity>> {
        futures::stream::empty().boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
                return Ok(());
            };
            fs::metadata(parent)
                .await
                .map(|_| ())
                .map_err(|source| {
                    StorageError::from(FileStoreError::Directory {
                        path: parent.to_path_buf(),
                        source,
                    })
                })
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_directory().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{GroupEntity, PlayerEntity};

    fn sample() -> CompetitionEntity {
        CompetitionEntity {
            groups: vec![GroupEntity {
                id: "group_1".into(),
                name: "A".into(),
                players: vec![PlayerEntity {
                    id: "player_1".into(),
                    name: "Taro".into(),
                    group_id: "group_1".into(),
                }],
            }],
            scores: Vec::new(),
            current_hole: 5,
        }
    }

    #[tokio::test]
    async fn load_returns_none_before_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path().join("state.json"))
            .await
            .unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path().join("nested/state.json"))
            .await
            .unwrap();

        store.save(sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample()));
        assert!(!store.temp_path().exists());
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStateStore::open(&path).await.unwrap();
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
    }

    #[tokio::test]
    async fn file_store_has_no_change_feed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path().join("state.json"))
            .await
            .unwrap();
        assert!(store.changes().next().await.is_none());
    }
}
