pub mod competition;
pub mod ledger;
pub mod ranking;
mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::debug;

use crate::{
    config::AppConfig, dao::state_store::StateStore, error::ServiceError, services::sse_events,
    state::competition::CompetitionState,
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Central application state: the competition snapshot, the storage handle and
/// the broadcast channels observers listen on.
pub struct AppState {
    config: AppConfig,
    state_store: RwLock<Option<Arc<dyn StateStore>>>,
    competition: RwLock<CompetitionState>,
    sse: SseHub,
    degraded: watch::Sender<bool>,
    revision: watch::Sender<u64>,
    /// Highest revision known to be written to the store.
    persisted: watch::Sender<u64>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let (revision_tx, _rx) = watch::channel(0);
        let (persisted_tx, _rx) = watch::channel(0);
        Arc::new(Self {
            sse: SseHub::new(config.sse_capacity),
            config,
            state_store: RwLock::new(None),
            competition: RwLock::new(CompetitionState::default()),
            degraded: degraded_tx,
            revision: revision_tx,
            persisted: persisted_tx,
        })
    }

    /// Runtime configuration the application was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current state store, if one is installed.
    pub async fn state_store(&self) -> Option<Arc<dyn StateStore>> {
        let guard = self.state_store.read().await;
        guard.as_ref().cloned()
    }

    /// Same as [`AppState::state_store`] but reports degraded mode as an error.
    pub async fn require_state_store(&self) -> Result<Arc<dyn StateStore>, ServiceError> {
        self.state_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new state store implementation and leave degraded mode.
    pub async fn set_state_store(&self, store: Arc<dyn StateStore>) {
        {
            let mut guard = self.state_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current state store and enter degraded mode.
    pub async fn clear_state_store(&self) {
        {
            let mut guard = self.state_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, notifying SSE clients when the value changes.
    pub fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });

        if changed {
            sse_events::broadcast_system_status(self, value);
        }
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Clone the current competition snapshot.
    pub async fn snapshot(&self) -> CompetitionState {
        self.competition.read().await.clone()
    }

    /// Clone the current snapshot together with the revision it belongs to.
    pub async fn versioned_snapshot(&self) -> (CompetitionState, u64) {
        let guard = self.competition.read().await;
        (guard.clone(), *self.revision.borrow())
    }

    /// Run a read-only projection against the current competition snapshot.
    pub async fn read_competition<F, T>(&self, read: F) -> T
    where
        F: FnOnce(&CompetitionState) -> T,
    {
        let guard = self.competition.read().await;
        read(&guard)
    }

    /// Replace the competition snapshot with the result of `work`.
    ///
    /// `work` receives a copy of the current snapshot and returns the next one
    /// along with a value for the caller. When the snapshot actually changed
    /// the revision is bumped (scheduling persistence) and observers are
    /// notified before the lock is released, so events leave in commit order.
    pub async fn update_competition<F, T>(&self, work: F) -> T
    where
        F: FnOnce(CompetitionState) -> (CompetitionState, T),
    {
        let mut guard = self.competition.write().await;
        let (next, outcome) = work(guard.clone());
        if next != *guard {
            *guard = next;
            self.revision.send_modify(|revision| *revision += 1);
            sse_events::broadcast_competition(self, &guard);
        }
        outcome
    }

    /// Adopt a snapshot received from the storage change feed.
    ///
    /// Remote snapshots are not written back, so the revision is left untouched.
    /// While local edits are still waiting to be saved the incoming snapshot is
    /// dropped: it is either an echo of an older save or will be overwritten by
    /// the pending one. Returns whether the local snapshot changed.
    pub async fn apply_remote(&self, incoming: CompetitionState) -> bool {
        let mut guard = self.competition.write().await;
        let revision = *self.revision.borrow();
        let persisted = *self.persisted.borrow();
        if revision > persisted {
            debug!(revision, persisted, "unsaved local edits; ignoring remote snapshot");
            return false;
        }
        if *guard == incoming {
            debug!("remote snapshot matches local state; ignoring");
            return false;
        }
        *guard = incoming;
        sse_events::broadcast_competition(self, &guard);
        true
    }

    /// Seed the competition with a snapshot loaded from storage.
    ///
    /// Local edits made while no store was reachable win over the stored copy;
    /// in that case the local snapshot is scheduled for persistence instead.
    /// Returns whether the loaded snapshot was adopted.
    pub async fn hydrate(&self, loaded: CompetitionState) -> bool {
        let mut guard = self.competition.write().await;
        if *self.revision.borrow() != 0 {
            drop(guard);
            self.request_persist();
            return false;
        }
        if *guard != loaded {
            *guard = loaded;
            sse_events::broadcast_competition(self, &guard);
        }
        true
    }

    /// Current revision of the competition snapshot (bumped by local edits).
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribe to revision bumps; used by the persistence worker.
    pub fn revision_watcher(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Highest revision written to the store so far.
    pub fn persisted_revision(&self) -> u64 {
        *self.persisted.borrow()
    }

    /// Record that the snapshot at `revision` reached the store.
    pub fn mark_persisted(&self, revision: u64) {
        self.persisted.send_if_modified(|current| {
            if revision > *current {
                *current = revision;
                true
            } else {
                false
            }
        });
    }

    /// Schedule a save of the current snapshot without changing it.
    pub fn request_persist(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
