use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};
use validator::Validate;

use crate::{
    dto::{
        common::PlayerScoreSummary,
        ledger::{PlayerHolePath, ScoreEntryRequest},
    },
    error::AppError,
    services::ledger_service,
    state::SharedState,
};

/// Routes recording individual scores.
pub fn router() -> Router<SharedState> {
    Router::new().route("/players/{player_id}/holes/{hole}", put(record_score))
}

/// Enter or overwrite the strokes of one player on one hole.
#[utoipa::path(
    put,
    path = "/players/{player_id}/holes/{hole}",
    tag = "players",
    params(PlayerHolePath),
    request_body = ScoreEntryRequest,
    responses(
        (status = 200, description = "Updated score card", body = PlayerScoreSummary),
        (status = 400, description = "Hole, strokes or par out of range"),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn record_score(
    State(state): State<SharedState>,
    Path(path): Path<PlayerHolePath>,
    Json(payload): Json<ScoreEntryRequest>,
) -> Result<Json<PlayerScoreSummary>, AppError> {
    path.validate()?;
    payload.validate()?;
    let card = ledger_service::record_score(
        &state,
        &path.player_id,
        path.hole,
        payload.score,
        payload.par,
    )
    .await?;
    Ok(Json(card))
}
