//! Score ledger: pure transformations over groups and score cards.
//!
//! Every operation takes the collections it changes by value and hands back
//! the updated collection. Operations that cannot apply (unknown group, full
//! group, unknown player) return their input unchanged.

use crate::state::competition::{Group, HoleScore, Player, PlayerScore};

/// Append a new, empty group named `name`.
pub fn add_group(mut groups: Vec<Group>, name: impl Into<String>) -> Vec<Group> {
    groups.push(Group::new(name));
    groups
}

/// Append a player to `group_id` unless the group is unknown or already full.
pub fn add_player(mut groups: Vec<Group>, group_id: &str, name: impl Into<String>) -> Vec<Group> {
    match groups.iter_mut().find(|group| group.id == group_id) {
        Some(group) if !group.is_full() => {
            let player = Player::new(name, group.id.clone());
            group.players.push(player);
        }
        _ => {}
    }
    groups
}

/// Record `strokes` and `par` for `hole_number` on the player's score card.
///
/// The card is created on first use from the player and group found in
/// `groups`; when the player is not registered the scores come back unchanged.
pub fn upsert_score(
    mut scores: Vec<PlayerScore>,
    player_id: &str,
    hole_number: u32,
    strokes: i32,
    par: i32,
    groups: &[Group],
) -> Vec<PlayerScore> {
    let hole = HoleScore {
        hole_number,
        score: strokes,
        par,
    };

    if let Some(entry) = scores.iter_mut().find(|entry| entry.player_id == player_id) {
        entry.record_hole(hole);
        return scores;
    }

    if let Some((player, group)) = find_player(groups, player_id) {
        scores.push(PlayerScore::new(player, group, vec![hole]));
    }
    scores
}

/// Drop `hole_number` from the score card of every player in `group_id`.
///
/// Cards left without any hole stay in the ledger.
pub fn reset_hole(
    mut scores: Vec<PlayerScore>,
    group_id: &str,
    hole_number: u32,
    groups: &[Group],
) -> Vec<PlayerScore> {
    let Some(group) = find_group(groups, group_id) else {
        return scores;
    };

    for player in &group.players {
        if let Some(entry) = scores.iter_mut().find(|entry| entry.player_id == player.id) {
            entry.clear_hole(hole_number);
        }
    }
    scores
}

/// Confirm `hole_number` for every player in `group_id`.
///
/// Players that already have strokes for the hole keep them, re-stamped with
/// `par`; players without an entry are recorded at par.
pub fn confirm_group_hole(
    mut scores: Vec<PlayerScore>,
    group_id: &str,
    hole_number: u32,
    par: i32,
    groups: &[Group],
) -> Vec<PlayerScore> {
    let Some(group) = find_group(groups, group_id) else {
        return scores;
    };

    for player in &group.players {
        let strokes = player_score(&scores, &player.id)
            .and_then(|entry| entry.hole(hole_number))
            .map(|hole| hole.score)
            .unwrap_or(par);
        scores = upsert_score(scores, &player.id, hole_number, strokes, par, groups);
    }
    scores
}

/// Look up a group by identifier.
pub fn find_group<'a>(groups: &'a [Group], group_id: &str) -> Option<&'a Group> {
    groups.iter().find(|group| group.id == group_id)
}

/// Look up a player together with the group that holds it.
pub fn find_player<'a>(groups: &'a [Group], player_id: &str) -> Option<(&'a Player, &'a Group)> {
    groups.iter().find_map(|group| {
        group
            .players
            .iter()
            .find(|player| player.id == player_id)
            .map(|player| (player, group))
    })
}

/// Look up the score card of a player.
pub fn player_score<'a>(scores: &'a [PlayerScore], player_id: &str) -> Option<&'a PlayerScore> {
    scores.iter().find(|entry| entry.player_id == player_id)
}
