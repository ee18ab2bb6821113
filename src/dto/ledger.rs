use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::dto::{common::PlayerScoreSummary, validation::validate_name};

/// Payload for `POST /groups`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGroupRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
}

/// Payload for `POST /groups/{group_id}/players`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddPlayerRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
}

/// Strokes entered for one player on one hole.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScoreEntryRequest {
    #[validate(range(min = 1, max = 20))]
    pub score: i32,
    /// Par of the hole; the configured default par when omitted.
    #[serde(default)]
    #[validate(range(min = 3, max = 6))]
    pub par: Option<i32>,
}

/// Optional body of the confirm action.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct ConfirmHoleRequest {
    #[serde(default)]
    #[validate(range(min = 3, max = 6))]
    pub par: Option<i32>,
}

/// Payload for `PUT /state/current-hole`.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CurrentHoleRequest {
    #[validate(range(min = 1, max = 18))]
    pub current_hole: u32,
}

/// Hole cursor after an update.
pub type CurrentHoleResponse = CurrentHoleRequest;

/// Path of the group-wide hole actions.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Path)]
pub struct GroupHolePath {
    /// Identifier of the group.
    pub group_id: String,
    /// Hole number (1-18).
    #[validate(range(min = 1, max = 18))]
    pub hole: u32,
}

/// Path of the per-player score entry.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Path)]
pub struct PlayerHolePath {
    /// Identifier of the player.
    pub player_id: String,
    /// Hole number (1-18).
    #[validate(range(min = 1, max = 18))]
    pub hole: u32,
}

/// Score cards of a group after a confirm or reset of one hole.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupHoleScores {
    pub group_id: String,
    pub hole_number: u32,
    /// Cards of the group's players that exist in the ledger, in group order.
    pub scores: Vec<PlayerScoreSummary>,
}
