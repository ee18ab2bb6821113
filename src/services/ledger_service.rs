use tracing::info;

use crate::{
    dto::{
        common::{GroupSummary, PlayerScoreSummary, PlayerSummary, StateSnapshot},
        ledger::{CurrentHoleResponse, GroupHoleScores},
    },
    error::ServiceError,
    state::{
        SharedState,
        competition::{CompetitionState, MAX_GROUP_SIZE},
        ledger,
    },
};

/// Current competition snapshot.
pub async fn get_state(state: &SharedState) -> StateSnapshot {
    state.read_competition(|competition| StateSnapshot::from(competition)).await
}

/// Append a new, empty group.
pub async fn add_group(state: &SharedState, name: &str) -> Result<GroupSummary, ServiceError> {
    let name = name.trim().to_string();
    let created = state
        .update_competition(|mut competition| {
            competition.groups = ledger::add_group(competition.groups, name);
            let created = competition.groups.last().map(GroupSummary::from);
            (competition, created)
        })
        .await
        .ok_or_else(|| ServiceError::InvalidState("group was not created".into()))?;

    info!(group_id = %created.id, name = %created.name, "group created");
    Ok(created)
}

/// Add a player to a group. Unknown groups are reported as not found and
/// full groups as a conflict.
pub async fn add_player(
    state: &SharedState,
    group_id: &str,
    name: &str,
) -> Result<PlayerSummary, ServiceError> {
    let name = name.trim().to_string();
    let player = state
        .update_competition(|mut competition| {
            let size = ledger::find_group(&competition.groups, group_id).map(|g| g.players.len());
            let outcome = match size {
                None => Err(group_not_found(group_id)),
                Some(size) if size >= MAX_GROUP_SIZE => Err(ServiceError::InvalidState(format!(
                    "group {group_id} already has {MAX_GROUP_SIZE} players"
                ))),
                Some(size) => {
                    competition.groups = ledger::add_player(competition.groups, group_id, name);
                    ledger::find_group(&competition.groups, group_id)
                        .and_then(|group| group.players.get(size))
                        .map(PlayerSummary::from)
                        .ok_or_else(|| ServiceError::InvalidState("player was not added".into()))
                }
            };
            (competition, outcome)
        })
        .await?;

    info!(player_id = %player.id, group_id, name = %player.name, "player added");
    Ok(player)
}

/// Record strokes for one player on one hole. `par` falls back to the
/// configured default.
pub async fn record_score(
    state: &SharedState,
    player_id: &str,
    hole: u32,
    strokes: i32,
    par: Option<i32>,
) -> Result<PlayerScoreSummary, ServiceError> {
    let par = par.unwrap_or(state.config().default_par);
    let card = state
        .update_competition(|mut competition| {
            if ledger::find_player(&competition.groups, player_id).is_none() {
                return (competition, Err(player_not_found(player_id)));
            }
            competition.scores = ledger::upsert_score(
                competition.scores,
                player_id,
                hole,
                strokes,
                par,
                &competition.groups,
            );
            let card = ledger::player_score(&competition.scores, player_id)
                .map(PlayerScoreSummary::from)
                .ok_or_else(|| player_not_found(player_id));
            (competition, card)
        })
        .await?;

    info!(player_id, hole, strokes, par, net = card.net_score, "score recorded");
    Ok(card)
}

/// Record the displayed value of every player of a group on one hole:
/// entered strokes are kept, untouched players are recorded at par.
pub async fn confirm_group_hole(
    state: &SharedState,
    group_id: &str,
    hole: u32,
    par: Option<i32>,
) -> Result<GroupHoleScores, ServiceError> {
    let par = par.unwrap_or(state.config().default_par);
    let scores = state
        .update_competition(|mut competition| {
            if ledger::find_group(&competition.groups, group_id).is_none() {
                return (competition, Err(group_not_found(group_id)));
            }
            competition.scores = ledger::confirm_group_hole(
                competition.scores,
                group_id,
                hole,
                par,
                &competition.groups,
            );
            let scores = group_hole_scores(&competition, group_id, hole);
            (competition, Ok(scores))
        })
        .await?;

    info!(group_id, hole, par, "group hole confirmed");
    Ok(scores)
}

/// Remove one hole from the cards of every player of a group.
pub async fn reset_group_hole(
    state: &SharedState,
    group_id: &str,
    hole: u32,
) -> Result<GroupHoleScores, ServiceError> {
    let scores = state
        .update_competition(|mut competition| {
            if ledger::find_group(&competition.groups, group_id).is_none() {
                return (competition, Err(group_not_found(group_id)));
            }
            competition.scores =
                ledger::reset_hole(competition.scores, group_id, hole, &competition.groups);
            let scores = group_hole_scores(&competition, group_id, hole);
            (competition, Ok(scores))
        })
        .await?;

    info!(group_id, hole, "group hole reset");
    Ok(scores)
}

/// Move the hole cursor shown by clients.
pub async fn set_current_hole(state: &SharedState, hole: u32) -> CurrentHoleResponse {
    state
        .update_competition(|mut competition| {
            competition.current_hole = hole;
            (competition, ())
        })
        .await;

    CurrentHoleResponse { current_hole: hole }
}

fn group_hole_scores(competition: &CompetitionState, group_id: &str, hole: u32) -> GroupHoleScores {
    let scores = ledger::find_group(&competition.groups, group_id)
        .map(|group| {
            group
                .players
                .iter()
                .filter_map(|player| ledger::player_score(&competition.scores, &player.id))
                .map(PlayerScoreSummary::from)
                .collect()
        })
        .unwrap_or_default();

    GroupHoleScores {
        group_id: group_id.to_string(),
        hole_number: hole,
        scores,
    }
}

fn group_not_found(group_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("group {group_id}"))
}

fn player_not_found(player_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("player {player_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    async fn group_with_players(state: &SharedState, players: usize) -> (String, Vec<String>) {
        let group = add_group(state, "Morning").await.unwrap();
        let mut ids = Vec::new();
        for index in 0..players {
            let player = add_player(state, &group.id, &format!("P{index}"))
                .await
                .unwrap();
            ids.push(player.id);
        }
        (group.id, ids)
    }

    #[tokio::test]
    async fn fifth_player_is_a_conflict() {
        let state = AppState::new(AppConfig::default());
        let (group_id, _) = group_with_players(&state, 4).await;

        let err = add_player(&state, &group_id, "Extra").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(state.snapshot().await.groups[0].players.len(), 4);
    }

    #[tokio::test]
    async fn unknown_targets_are_not_found() {
        let state = AppState::new(AppConfig::default());
        let revision = state.revision();

        assert!(matches!(
            add_player(&state, "group_missing", "Ada").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            record_score(&state, "player_missing", 1, 4, None).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            reset_group_hole(&state, "group_missing", 1).await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(state.revision(), revision);
    }

    #[tokio::test]
    async fn record_score_uses_default_par() {
        let state = AppState::new(AppConfig::default());
        let (_, players) = group_with_players(&state, 1).await;

        let card = record_score(&state, &players[0], 1, 5, None).await.unwrap();
        assert_eq!(card.total_score, 5);
        assert_eq!(card.total_par, 4);
        assert_eq!(card.net_score, 1);
    }

    #[tokio::test]
    async fn confirm_then_reset_group_hole() {
        let state = AppState::new(AppConfig::default());
        let (group_id, players) = group_with_players(&state, 2).await;
        record_score(&state, &players[0], 3, 6, Some(5)).await.unwrap();

        let confirmed = confirm_group_hole(&state, &group_id, 3, Some(5)).await.unwrap();
        let totals: Vec<_> = confirmed.scores.iter().map(|c| c.total_score).collect();
        assert_eq!(totals, vec![6, 5]);

        let reset = reset_group_hole(&state, &group_id, 3).await.unwrap();
        assert!(reset.scores.iter().all(|c| c.scores.is_empty() && c.net_score == 0));
    }

    #[tokio::test]
    async fn mutations_bump_revision() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.revision(), 0);
        set_current_hole(&state, 7).await;
        assert_eq!(state.revision(), 1);
        // Same value again leaves the snapshot untouched.
        set_current_hole(&state, 7).await;
        assert_eq!(state.revision(), 1);
        assert_eq!(get_state(&state).await.current_hole, 7);
    }
}
