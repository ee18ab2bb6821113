use std::{future::Future, sync::Arc, time::Duration};

use futures::StreamExt;
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use crate::{
    dao::{
        models::CompetitionEntity,
        state_store::StateStore,
        storage::StorageError,
    },
    error::ServiceError,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;
/// Pause before a failed save is retried.
const SAVE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Reconnect to the state store and keep the shared state in degraded mode while it is unavailable.
///
/// Every fresh connection loads the stored competition and starts following
/// the store's change feed; both are torn down when the connection is given up.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn StateStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                hydrate_from(&state, store.as_ref()).await;
                state.set_state_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                let feed = spawn_change_feed(state.clone(), store.clone());
                monitor(&state, store.as_ref()).await;
                feed.abort();
                state.clear_state_store().await;

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll the store health until reconnect attempts are exhausted.
async fn monitor(state: &SharedState, store: &dyn StateStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                debug!(error = %err, "storage health check failed");
                if reconnect(state, store).await {
                    state.update_degraded(false);
                    sleep(HEALTH_POLL_INTERVAL).await;
                } else {
                    warn!("exhausted storage reconnect attempts; staying in degraded mode");
                    return;
                }
            }
        }
    }
}

async fn reconnect(state: &SharedState, store: &dyn StateStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }
    false
}

/// Seed the shared state from the store. A failed load keeps the in-memory
/// state and logs a warning.
async fn hydrate_from(state: &SharedState, store: &dyn StateStore) {
    match store.load().await {
        Ok(Some(entity)) => {
            if state.hydrate(entity.into()).await {
                info!("competition state loaded from storage");
            } else {
                info!("local edits made while degraded take precedence over stored state");
            }
        }
        Ok(None) => {
            info!("no stored competition; starting empty");
            if state.revision() != 0 {
                state.request_persist();
            }
        }
        Err(err) => warn!(error = %err, "failed to load stored competition; keeping current state"),
    }
}

/// Follow the store's change feed, applying remote snapshots to the shared state.
fn spawn_change_feed(state: SharedState, store: Arc<dyn StateStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut delay = INITIAL_DELAY;
        loop {
            let mut changes = store.changes();
            let mut failed = false;
            while let Some(change) = changes.next().await {
                match change {
                    Ok(entity) => {
                        delay = INITIAL_DELAY;
                        if state.apply_remote(entity.into()).await {
                            info!("applied remote competition change");
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "storage change feed failed");
                        failed = true;
                        break;
                    }
                }
            }

            if !failed {
                debug!("storage change feed ended");
                return;
            }
            sleep(delay).await;
            delay = (delay * 2).min(MAX_DELAY);
        }
    })
}

/// Write the current snapshot to the installed store and record its revision
/// as persisted.
///
/// Returns `Ok(false)` when no store is installed (degraded mode).
pub async fn persist_snapshot(state: &SharedState) -> Result<bool, ServiceError> {
    let Some(store) = state.state_store().await else {
        return Ok(false);
    };
    let (snapshot, revision) = state.versioned_snapshot().await;
    store.save(CompetitionEntity::from(snapshot)).await?;
    state.mark_persisted(revision);
    Ok(true)
}

/// Save the competition whenever its revision moves, once `debounce` has
/// elapsed without further changes.
///
/// Failed saves flip the service into degraded mode and are retried; while no
/// store is installed nothing is written, and the next connection requests a
/// save of any local edits.
pub async fn run_persistence(state: SharedState, debounce: Duration) {
    let mut revisions = state.revision_watcher();
    let mut retry = false;

    loop {
        if !retry && revisions.changed().await.is_err() {
            return;
        }

        loop {
            match tokio::time::timeout(debounce, revisions.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return,
                Err(_) => break,
            }
        }
        let revision = *revisions.borrow_and_update();

        match persist_snapshot(&state).await {
            Ok(true) => {
                debug!(revision, "competition state saved");
                retry = false;
            }
            Ok(false) => {
                debug!(revision, "no state store installed; save deferred");
                retry = false;
            }
            Err(err) => {
                warn!(revision, error = %err, "failed to save competition state");
                state.update_degraded(true);
                sleep(SAVE_RETRY_DELAY).await;
                retry = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::state_store::file::FileStateStore,
        services::ledger_service,
        state::AppState,
    };

    #[tokio::test]
    async fn persist_without_store_is_deferred() {
        let state = AppState::new(AppConfig::default());
        assert!(!persist_snapshot(&state).await.unwrap());
    }

    #[tokio::test]
    async fn persisted_snapshot_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path().join("state.json"))
            .await
            .unwrap();
        let state = AppState::new(AppConfig::default());
        state.set_state_store(Arc::new(store.clone())).await;

        let group = ledger_service::add_group(&state, "A").await.unwrap();
        let player = ledger_service::add_player(&state, &group.id, "Ada")
            .await
            .unwrap();
        ledger_service::record_score(&state, &player.id, 1, 3, Some(4))
            .await
            .unwrap();
        assert!(persist_snapshot(&state).await.unwrap());
        assert_eq!(state.persisted_revision(), state.revision());

        let fresh = AppState::new(AppConfig::default());
        hydrate_from(&fresh, &store).await;
        assert_eq!(fresh.snapshot().await, state.snapshot().await);
        assert_eq!(fresh.snapshot().await.scores[0].net_score(), -1);
    }

    #[tokio::test]
    async fn local_edits_win_over_stored_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path().join("state.json"))
            .await
            .unwrap();
        store
            .save(CompetitionEntity {
                current_hole: 9,
                ..CompetitionEntity::default()
            })
            .await
            .unwrap();

        let state = AppState::new(AppConfig::default());
        ledger_service::set_current_hole(&state, 3).await;
        let revision = state.revision();

        hydrate_from(&state, &store).await;
        assert_eq!(state.snapshot().await.current_hole, 3);
        assert!(state.revision() > revision);
    }
}
