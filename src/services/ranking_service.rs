use crate::{dto::ranking::RankingResponse, state::SharedState};

/// Leaderboard computed from the current score cards.
pub async fn get_ranking(state: &SharedState) -> RankingResponse {
    state
        .read_competition(|competition| RankingResponse::from_scores(&competition.scores))
        .await
}
