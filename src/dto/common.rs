use serde::Serialize;
use utoipa::ToSchema;

use crate::state::competition::{CompetitionState, Group, HoleScore, Player, PlayerScore};

/// Player as shown to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    pub group_id: String,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            group_id: player.group_id.clone(),
        }
    }
}

/// Group with its players in insertion order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
    pub players: Vec<PlayerSummary>,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            players: group.players.iter().map(PlayerSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoleScoreSummary {
    pub hole_number: u32,
    pub score: i32,
    pub par: i32,
}

impl From<&HoleScore> for HoleScoreSummary {
    fn from(hole: &HoleScore) -> Self {
        Self {
            hole_number: hole.hole_number,
            score: hole.score,
            par: hole.par,
        }
    }
}

/// Score card of one player with its running totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScoreSummary {
    pub player_id: String,
    pub player_name: String,
    pub group_id: String,
    pub group_name: String,
    pub scores: Vec<HoleScoreSummary>,
    pub total_score: i64,
    pub total_par: i64,
    /// Strokes relative to par; negative is under par.
    pub net_score: i64,
}

impl From<&PlayerScore> for PlayerScoreSummary {
    fn from(entry: &PlayerScore) -> Self {
        Self {
            player_id: entry.player_id.clone(),
            player_name: entry.player_name.clone(),
            group_id: entry.group_id.clone(),
            group_name: entry.group_name.clone(),
            scores: entry.scores().iter().map(HoleScoreSummary::from).collect(),
            total_score: entry.total_score(),
            total_par: entry.total_par(),
            net_score: entry.net_score(),
        }
    }
}

/// Full competition snapshot, sent by `GET /state` and the `state.changed` event.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub groups: Vec<GroupSummary>,
    pub scores: Vec<PlayerScoreSummary>,
    pub current_hole: u32,
}

impl From<&CompetitionState> for StateSnapshot {
    fn from(state: &CompetitionState) -> Self {
        Self {
            groups: state.groups.iter().map(GroupSummary::from).collect(),
            scores: state.scores.iter().map(PlayerScoreSummary::from).collect(),
            current_hole: state.current_hole,
        }
    }
}
