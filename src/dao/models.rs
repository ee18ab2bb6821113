use serde::{Deserialize, Serialize};

use crate::state::competition::FIRST_HOLE;

/// Player record as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    pub id: String,
    pub name: String,
    pub group_id: String,
}

/// Group record with its players in registration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub players: Vec<PlayerEntity>,
}

/// Strokes and par recorded for one hole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HoleScoreEntity {
    pub hole_number: u32,
    pub score: i32,
    pub par: i32,
}

/// Denormalized score card. Totals are written for readers of the raw
/// document and recomputed from `scores` on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScoreEntity {
    pub player_id: String,
    pub player_name: String,
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    pub scores: Vec<HoleScoreEntity>,
    #[serde(default)]
    pub total_score: i64,
    #[serde(default)]
    pub total_par: i64,
    #[serde(default)]
    pub net_score: i64,
}

/// Whole competition document shared by every storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionEntity {
    #[serde(default)]
    pub groups: Vec<GroupEntity>,
    #[serde(default)]
    pub scores: Vec<PlayerScoreEntity>,
    #[serde(default = "default_current_hole", alias = "current_hole")]
    pub current_hole: u32,
}

impl Default for CompetitionEntity {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            scores: Vec::new(),
            current_hole: default_current_hole(),
        }
    }
}

/// Hole cursor used when a document does not carry one.
pub fn default_current_hole() -> u32 {
    FIRST_HOLE
}
