use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod groups;
pub mod health;
pub mod players;
pub mod ranking;
pub mod snapshot;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(snapshot::router())
        .merge(groups::router())
        .merge(players::router())
        .merge(ranking::router())
        .merge(sse::router())
        .merge(docs::router())
        .with_state(state)
}
