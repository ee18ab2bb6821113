use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use validator::Validate;

use crate::{
    dto::{
        common::{GroupSummary, PlayerSummary},
        ledger::{
            AddPlayerRequest, ConfirmHoleRequest, CreateGroupRequest, GroupHolePath,
            GroupHoleScores,
        },
    },
    error::AppError,
    services::ledger_service,
    state::SharedState,
};

/// Routes managing groups and the group-wide hole actions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/groups", post(create_group))
        .route("/groups/{group_id}/players", post(add_player))
        .route("/groups/{group_id}/holes/{hole}/confirm", post(confirm_hole))
        .route("/groups/{group_id}/holes/{hole}", delete(reset_hole))
}

/// Create an empty group.
#[utoipa::path(
    post,
    path = "/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = GroupSummary),
        (status = 400, description = "Invalid name")
    )
)]
pub async fn create_group(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<Json<GroupSummary>, AppError> {
    payload.validate()?;
    let group = ledger_service::add_group(&state, &payload.name).await?;
    Ok(Json(group))
}

/// Add a player to a group of fewer than four players.
#[utoipa::path(
    post,
    path = "/groups/{group_id}/players",
    tag = "groups",
    params(("group_id" = String, Path, description = "Identifier of the group")),
    request_body = AddPlayerRequest,
    responses(
        (status = 200, description = "Player added", body = PlayerSummary),
        (status = 404, description = "Unknown group"),
        (status = 409, description = "Group already has four players")
    )
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Path(group_id): Path<String>,
    Json(payload): Json<AddPlayerRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    payload.validate()?;
    let player = ledger_service::add_player(&state, &group_id, &payload.name).await?;
    Ok(Json(player))
}

/// Confirm a hole for the whole group; players without strokes are recorded at par.
#[utoipa::path(
    post,
    path = "/groups/{group_id}/holes/{hole}/confirm",
    tag = "groups",
    params(GroupHolePath),
    request_body = ConfirmHoleRequest,
    responses(
        (status = 200, description = "Hole confirmed", body = GroupHoleScores),
        (status = 404, description = "Unknown group")
    )
)]
pub async fn confirm_hole(
    State(state): State<SharedState>,
    Path(path): Path<GroupHolePath>,
    payload: Option<Json<ConfirmHoleRequest>>,
) -> Result<Json<GroupHoleScores>, AppError> {
    path.validate()?;
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    payload.validate()?;
    let scores =
        ledger_service::confirm_group_hole(&state, &path.group_id, path.hole, payload.par).await?;
    Ok(Json(scores))
}

/// Clear a hole from the cards of every player in the group.
#[utoipa::path(
    delete,
    path = "/groups/{group_id}/holes/{hole}",
    tag = "groups",
    params(GroupHolePath),
    responses(
        (status = 200, description = "Hole reset", body = GroupHoleScores),
        (status = 404, description = "Unknown group")
    )
)]
pub async fn reset_hole(
    State(state): State<SharedState>,
    Path(path): Path<GroupHolePath>,
) -> Result<Json<GroupHoleScores>, AppError> {
    path.validate()?;
    let scores = ledger_service::reset_group_hole(&state, &path.group_id, path.hole).await?;
    Ok(Json(scores))
}
