use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    competition::{FIRST_HOLE, PlayerScore},
    ranking::{self, RankingSummary, Standing},
};

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntry {
    /// Competition place; tied players share it.
    pub position: usize,
    pub player_id: String,
    pub player_name: String,
    pub group_id: String,
    pub group_name: String,
    /// Strokes over all recorded holes.
    pub total_score: i64,
    /// Par over all recorded holes.
    pub total_par: i64,
    /// `totalScore - totalPar`; lower is better.
    pub net_score: i64,
    /// Number of holes with a recorded score.
    pub holes_played: usize,
    /// Highest hole with a recorded score (1 before any score).
    pub last_hole: u32,
}

impl From<Standing> for StandingEntry {
    fn from(standing: Standing) -> Self {
        let entry = standing.entry;
        Self {
            position: standing.position,
            total_score: entry.total_score(),
            total_par: entry.total_par(),
            net_score: entry.net_score(),
            holes_played: entry.holes_played(),
            last_hole: entry.last_hole().unwrap_or(FIRST_HOLE),
            player_id: entry.player_id,
            player_name: entry.player_name,
            group_id: entry.group_id,
            group_name: entry.group_name,
        }
    }
}

/// Aggregate figures shown next to the leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingSummaryDto {
    /// Number of ranked players.
    pub participants: usize,
    /// Lowest net score; absent when nobody is ranked.
    pub leader_net_score: Option<i64>,
    /// Mean net score rounded to one decimal.
    pub average_net_score: Option<f64>,
    /// Number of groups with at least one ranked player.
    pub groups: usize,
}

impl From<RankingSummary> for RankingSummaryDto {
    fn from(summary: RankingSummary) -> Self {
        Self {
            participants: summary.participants,
            leader_net_score: summary.leader_net_score,
            average_net_score: summary.average_net_score,
            groups: summary.groups,
        }
    }
}

/// Body of `GET /ranking` and the `ranking.changed` event.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankingResponse {
    pub standings: Vec<StandingEntry>,
    pub summary: RankingSummaryDto,
}

impl RankingResponse {
    /// Rank the given score cards.
    pub fn from_scores(scores: &[PlayerScore]) -> Self {
        Self {
            standings: ranking::standings(scores)
                .into_iter()
                .map(StandingEntry::from)
                .collect(),
            summary: ranking::summary(scores).into(),
        }
    }
}
