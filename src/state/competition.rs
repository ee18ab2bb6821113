use uuid::Uuid;

use crate::dao::models::{
    CompetitionEntity, GroupEntity, HoleScoreEntity, PlayerEntity, PlayerScoreEntity,
};

/// Maximum number of players a single group can hold.
pub const MAX_GROUP_SIZE: usize = 4;
/// First hole of the course, also the initial hole cursor.
pub const FIRST_HOLE: u32 = 1;
/// Last hole of the course.
pub const LAST_HOLE: u32 = 18;

/// Participant registered in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique identifier (`player_<uuid>`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Identifier of the owning group.
    pub group_id: String,
}

/// Playing unit of at most [`MAX_GROUP_SIZE`] players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Unique identifier (`group_<uuid>`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Players in registration order.
    pub players: Vec<Player>,
}

/// Strokes and par recorded for a single hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleScore {
    /// Hole the entry belongs to.
    pub hole_number: u32,
    /// Strokes played.
    pub score: i32,
    /// Par of the hole when the entry was recorded.
    pub par: i32,
}

/// Denormalized score card for one player.
///
/// Totals are derived from the hole entries every time those change and
/// cannot be set from outside. They are kept in `i64` so no combination of
/// `i32` entries can overflow them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerScore {
    /// Player the card belongs to.
    pub player_id: String,
    /// Player name at card creation.
    pub player_name: String,
    /// Group snapshot taken when the card was created.
    pub group_id: String,
    /// Group name at card creation.
    pub group_name: String,
    scores: Vec<HoleScore>,
    total_score: i64,
    total_par: i64,
    net_score: i64,
}

/// Whole competition snapshot: groups, score cards and the hole cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionState {
    /// Registered groups in creation order.
    pub groups: Vec<Group>,
    /// Score cards in creation order.
    pub scores: Vec<PlayerScore>,
    /// Hole currently displayed for score entry.
    pub current_hole: u32,
}

impl Default for CompetitionState {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            scores: Vec::new(),
            current_hole: FIRST_HOLE,
        }
    }
}

impl Player {
    /// Create a player bound to `group_id`, allocating a fresh identifier.
    pub fn new(name: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: format!("player_{}", Uuid::now_v7().simple()),
            name: name.into(),
            group_id: group_id.into(),
        }
    }
}

impl Group {
    /// Create an empty group, allocating a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("group_{}", Uuid::now_v7().simple()),
            name: name.into(),
            players: Vec::new(),
        }
    }

    /// Whether the group already holds [`MAX_GROUP_SIZE`] players.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_GROUP_SIZE
    }
}

impl PlayerScore {
    /// Build a score card for `player` of `group` from the given holes.
    pub fn new(player: &Player, group: &Group, holes: Vec<HoleScore>) -> Self {
        Self::from_parts(
            player.id.clone(),
            player.name.clone(),
            group.id.clone(),
            group.name.clone(),
            holes,
        )
    }

    /// Build a score card from raw parts; duplicate holes keep the last entry.
    pub fn from_parts(
        player_id: String,
        player_name: String,
        group_id: String,
        group_name: String,
        holes: Vec<HoleScore>,
    ) -> Self {
        let mut card = Self {
            player_id,
            player_name,
            group_id,
            group_name,
            scores: Vec::with_capacity(holes.len()),
            total_score: 0,
            total_par: 0,
            net_score: 0,
        };
        for hole in holes {
            card.insert_hole(hole);
        }
        card.recompute();
        card
    }

    /// Hole entries ordered by hole number.
    pub fn scores(&self) -> &[HoleScore] {
        &self.scores
    }

    /// Sum of strokes over all recorded holes.
    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    /// Sum of par over all recorded holes.
    pub fn total_par(&self) -> i64 {
        self.total_par
    }

    /// Strokes over par; lower is better.
    pub fn net_score(&self) -> i64 {
        self.net_score
    }

    /// Entry recorded for `hole_number`, if any.
    pub fn hole(&self, hole_number: u32) -> Option<&HoleScore> {
        self.scores
            .iter()
            .find(|hole| hole.hole_number == hole_number)
    }

    /// Number of holes with an entry.
    pub fn holes_played(&self) -> usize {
        self.scores.len()
    }

    /// Highest hole number played so far.
    pub fn last_hole(&self) -> Option<u32> {
        self.scores.last().map(|hole| hole.hole_number)
    }

    /// Overwrite or insert the entry for `hole.hole_number`, then refresh totals.
    pub fn record_hole(&mut self, hole: HoleScore) {
        self.insert_hole(hole);
        self.recompute();
    }

    /// Remove the entry for `hole_number` if present, refreshing totals.
    /// Returns whether an entry was removed.
    pub fn clear_hole(&mut self, hole_number: u32) -> bool {
        let before = self.scores.len();
        self.scores.retain(|hole| hole.hole_number != hole_number);
        let removed = self.scores.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    fn insert_hole(&mut self, hole: HoleScore) {
        match self
            .scores
            .binary_search_by_key(&hole.hole_number, |existing| existing.hole_number)
        {
            Ok(index) => self.scores[index] = hole,
            Err(index) => self.scores.insert(index, hole),
        }
    }

    fn recompute(&mut self) {
        self.total_score = self.scores.iter().map(|hole| i64::from(hole.score)).sum();
        self.total_par = self.scores.iter().map(|hole| i64::from(hole.par)).sum();
        self.net_score = self.total_score - self.total_par;
    }
}

impl From<PlayerEntity> for Player {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            group_id: value.group_id,
        }
    }
}

impl From<Player> for PlayerEntity {
    fn from(value: Player) -> Self {
        Self {
            id: value.id,
            name: value.name,
            group_id: value.group_id,
        }
    }
}

impl From<GroupEntity> for Group {
    fn from(value: GroupEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            players: value.players.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Group> for GroupEntity {
    fn from(value: Group) -> Self {
        Self {
            id: value.id,
            name: value.name,
            players: value.players.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<HoleScoreEntity> for HoleScore {
    fn from(value: HoleScoreEntity) -> Self {
        Self {
            hole_number: value.hole_number,
            score: value.score,
            par: value.par,
        }
    }
}

impl From<HoleScore> for HoleScoreEntity {
    fn from(value: HoleScore) -> Self {
        Self {
            hole_number: value.hole_number,
            score: value.score,
            par: value.par,
        }
    }
}

/// Persisted totals are ignored and recomputed from the hole entries.
impl From<PlayerScoreEntity> for PlayerScore {
    fn from(value: PlayerScoreEntity) -> Self {
        Self::from_parts(
            value.player_id,
            value.player_name,
            value.group_id,
            value.group_name,
            value.scores.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<PlayerScore> for PlayerScoreEntity {
    fn from(value: PlayerScore) -> Self {
        Self {
            player_id: value.player_id,
            player_name: value.player_name,
            group_id: value.group_id,
            group_name: value.group_name,
            scores: value.scores.into_iter().map(Into::into).collect(),
            total_score: value.total_score,
            total_par: value.total_par,
            net_score: value.net_score,
        }
    }
}

impl From<CompetitionEntity> for CompetitionState {
    fn from(value: CompetitionEntity) -> Self {
        Self {
            groups: value.groups.into_iter().map(Into::into).collect(),
            scores: value.scores.into_iter().map(Into::into).collect(),
            current_hole: value.current_hole,
        }
    }
}

impl From<CompetitionState> for CompetitionEntity {
    fn from(value: CompetitionState) -> Self {
        Self {
            groups: value.groups.into_iter().map(Into::into).collect(),
            scores: value.scores.into_iter().map(Into::into).collect(),
            current_hole: value.current_hole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(holes: Vec<HoleScore>) -> PlayerScore {
        PlayerScore::from_parts(
            "player_1".into(),
            "Taro".into(),
            "group_1".into(),
            "A".into(),
            holes,
        )
    }

    fn hole(hole_number: u32, score: i32, par: i32) -> HoleScore {
        HoleScore {
            hole_number,
            score,
            par,
        }
    }

    #[test]
    fn totals_follow_hole_entries() {
        let mut entry = card(vec![hole(1, 5, 4), hole(2, 3, 3)]);
        assert_eq!(entry.total_score(), 8);
        assert_eq!(entry.total_par(), 7);
        assert_eq!(entry.net_score(), 1);

        entry.record_hole(hole(2, 2, 3));
        assert_eq!(entry.total_score(), 7);
        assert_eq!(entry.net_score(), 0);

        assert!(entry.clear_hole(1));
        assert!(!entry.clear_hole(1));
        assert_eq!(entry.total_score(), 2);
        assert_eq!(entry.total_par(), 3);
        assert_eq!(entry.net_score(), -1);
    }

    #[test]
    fn extreme_entries_do_not_overflow_totals() {
        let mut entry = card(vec![hole(1, i32::MAX, 4)]);
        entry.record_hole(hole(2, 1, 4));
        assert_eq!(entry.total_score(), i64::from(i32::MAX) + 1);
        assert_eq!(entry.total_par(), 8);
        assert_eq!(entry.net_score(), i64::from(i32::MAX) - 7);

        entry.record_hole(hole(3, i32::MIN, i32::MAX));
        assert_eq!(entry.total_score(), 0);
        assert_eq!(entry.net_score(), -(8 + i64::from(i32::MAX)));
    }

    #[test]
    fn holes_stay_ordered_and_unique() {
        let entry = card(vec![hole(9, 4, 4), hole(2, 5, 4), hole(9, 6, 4)]);
        let numbers: Vec<u32> = entry.scores().iter().map(|h| h.hole_number).collect();
        assert_eq!(numbers, vec![2, 9]);
        assert_eq!(entry.hole(9).map(|h| h.score), Some(6));
        assert_eq!(entry.last_hole(), Some(9));
        assert_eq!(entry.holes_played(), 2);
    }

    #[test]
    fn persisted_totals_are_recomputed() {
        let entity = PlayerScoreEntity {
            player_id: "player_1".into(),
            player_name: "Taro".into(),
            group_id: "group_1".into(),
            group_name: "A".into(),
            scores: vec![HoleScoreEntity {
                hole_number: 1,
                score: 6,
                par: 4,
            }],
            total_score: 99,
            total_par: 0,
            net_score: 99,
        };

        let entry = PlayerScore::from(entity);
        assert_eq!(entry.total_score(), 6);
        assert_eq!(entry.total_par(), 4);
        assert_eq!(entry.net_score(), 2);
    }

    #[test]
    fn identifiers_are_unique_within_a_tick() {
        let a = Group::new("A");
        let b = Group::new("A");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("group_"));

        let p = Player::new("Taro", &a.id);
        let q = Player::new("Taro", &a.id);
        assert_ne!(p.id, q.id);
        assert!(p.id.starts_with("player_"));
    }
}
