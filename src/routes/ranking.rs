use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::ranking::RankingResponse, services::ranking_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/ranking",
    tag = "ranking",
    responses((status = 200, description = "Standings and summary", body = RankingResponse))
)]
/// Leaderboard sorted by net score, lowest first.
pub async fn get_ranking(State(state): State<SharedState>) -> Json<RankingResponse> {
    Json(ranking_service::get_ranking(&state).await)
}

/// Configure the ranking routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/ranking", get(get_ranking))
}
