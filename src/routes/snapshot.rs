use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use validator::Validate;

use crate::{
    dto::{
        common::StateSnapshot,
        ledger::{CurrentHoleRequest, CurrentHoleResponse},
    },
    error::AppError,
    services::ledger_service,
    state::SharedState,
};

/// Routes exposing the whole competition snapshot and the hole cursor.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/state/current-hole", put(set_current_hole))
}

/// Return the groups, score cards and current hole.
#[utoipa::path(
    get,
    path = "/state",
    tag = "state",
    responses((status = 200, description = "Competition snapshot", body = StateSnapshot))
)]
pub async fn get_state(State(state): State<SharedState>) -> Json<StateSnapshot> {
    Json(ledger_service::get_state(&state).await)
}

/// Move the hole cursor shared by every client.
#[utoipa::path(
    put,
    path = "/state/current-hole",
    tag = "state",
    request_body = CurrentHoleRequest,
    responses(
        (status = 200, description = "Cursor moved", body = CurrentHoleResponse),
        (status = 400, description = "Hole outside 1-18")
    )
)]
pub async fn set_current_hole(
    State(state): State<SharedState>,
    Json(payload): Json<CurrentHoleRequest>,
) -> Result<Json<CurrentHoleResponse>, AppError> {
    payload.validate()?;
    let response = ledger_service::set_current_hole(&state, payload.current_hole).await;
    Ok(Json(response))
}
