//! golf-comp-back binary entrypoint wiring REST, SSE, and the state store.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "couch-store")]
use golf_comp_back::dao::state_store::couchdb::{CouchConfig, CouchStateStore};
use golf_comp_back::{
    config::AppConfig,
    dao::{
        state_store::{StateStore, file::FileStateStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let debounce = config.persist_debounce;
    let state_file = config.state_file.clone();
    let app_state = AppState::new(config);

    spawn_storage(app_state.clone(), state_file);
    tokio::spawn(storage_supervisor::run_persistence(
        app_state.clone(),
        debounce,
    ));

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the storage supervisor on CouchDB when it is configured, on the
/// local state file otherwise.
fn spawn_storage(state: SharedState, state_file: PathBuf) {
    if spawn_couch_storage(&state) {
        return;
    }

    info!(path = %state_file.display(), "using file state store");
    tokio::spawn(storage_supervisor::run(state, move || {
        let path = state_file.clone();
        async move {
            let store = FileStateStore::open(path).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn StateStore>)
        }
    }));
}

#[cfg(feature = "couch-store")]
fn spawn_couch_storage(state: &SharedState) -> bool {
    if !CouchConfig::is_configured() {
        return false;
    }

    info!("using CouchDB state store");
    tokio::spawn(storage_supervisor::run(state.clone(), || async {
        let config = CouchConfig::from_env().map_err(StorageError::from)?;
        let store = CouchStateStore::connect(config).await?;
        Ok::<_, StorageError>(Arc::new(store) as Arc<dyn StateStore>)
    }));
    true
}

#[cfg(not(feature = "couch-store"))]
fn spawn_couch_storage(_state: &SharedState) -> bool {
    false
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
