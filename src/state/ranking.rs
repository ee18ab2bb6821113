//! Ranking derived from the score ledger. Lower net score ranks first.

use std::collections::HashSet;

use crate::state::competition::PlayerScore;

/// Score card together with its place in the ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1-based place; players sharing a net score share a place.
    pub position: usize,
    /// Ranked score card.
    pub entry: PlayerScore,
}

/// Aggregate figures shown next to the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingSummary {
    /// Number of score cards.
    pub participants: usize,
    /// Best (lowest) net score, if anyone is ranked.
    pub leader_net_score: Option<i64>,
    /// Mean net score rounded to one decimal.
    pub average_net_score: Option<f64>,
    /// Number of distinct groups with at least one score card.
    pub groups: usize,
}

/// Return every score card sorted by ascending net score.
///
/// The sort is stable: cards with the same net score keep their ledger order.
pub fn rank(scores: &[PlayerScore]) -> Vec<PlayerScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by_key(|entry| entry.net_score());
    ranked
}

/// Rank the score cards and assign competition places (1, 2, 2, 4).
pub fn standings(scores: &[PlayerScore]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = Vec::with_capacity(scores.len());
    for (index, entry) in rank(scores).into_iter().enumerate() {
        let position = match standings.last() {
            Some(previous) if previous.entry.net_score() == entry.net_score() => previous.position,
            _ => index + 1,
        };
        standings.push(Standing { position, entry });
    }
    standings
}

/// Compute the summary figures for the given score cards.
pub fn summary(scores: &[PlayerScore]) -> RankingSummary {
    let participants = scores.len();
    let leader_net_score = scores.iter().map(PlayerScore::net_score).min();
    let average_net_score = (participants > 0).then(|| {
        let total: i64 = scores.iter().map(PlayerScore::net_score).sum();
        let mean = total as f64 / participants as f64;
        (mean * 10.0).round() / 10.0
    });
    let groups = scores
        .iter()
        .map(|entry| entry.group_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    RankingSummary {
        participants,
        leader_net_score,
        average_net_score,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::state::competition::HoleScore;

    fn card(id: &str, group: &str, net: i32) -> PlayerScore {
        PlayerScore::from_parts(
            id.into(),
            id.into(),
            group.into(),
            group.into(),
            vec![HoleScore {
                hole_number: 1,
                score: 4 + net,
                par: 4,
            }],
        )
    }

    fn ids(scores: &[PlayerScore]) -> Vec<&str> {
        scores.iter().map(|entry| entry.player_id.as_str()).collect()
    }

    #[test]
    fn lower_net_score_ranks_first() {
        let scores = vec![card("plus_one", "A", 1), card("minus_two", "A", -2)];
        let ranked = rank(&scores);
        assert_eq!(ids(&ranked), vec!["minus_two", "plus_one"]);
        // input untouched
        assert_eq!(ids(&scores), vec!["plus_one", "minus_two"]);
    }

    #[test]
    fn ties_keep_ledger_order() {
        let scores = vec![
            card("first", "A", 0),
            card("leader", "B", -1),
            card("second", "A", 0),
        ];
        assert_eq!(ids(&rank(&scores)), vec!["leader", "first", "second"]);
    }

    #[test]
    fn standings_share_places_on_ties() {
        let scores = vec![
            card("a", "A", 2),
            card("b", "A", -1),
            card("c", "B", 0),
            card("d", "B", 0),
        ];
        let ranked = standings(&scores);
        let positions: Vec<(usize, &str)> = ranked
            .iter()
            .map(|s| (s.position, s.entry.player_id.as_str()))
            .collect();
        assert_eq!(positions, vec![(1, "b"), (2, "c"), (2, "d"), (4, "a")]);
    }

    #[test]
    fn summary_of_empty_ranking() {
        let summary = summary(&[]);
        assert_eq!(summary.participants, 0);
        assert_eq!(summary.leader_net_score, None);
        assert_eq!(summary.average_net_score, None);
        assert_eq!(summary.groups, 0);
    }

    #[test]
    fn summary_figures() {
        let scores = vec![card("a", "A", 2), card("b", "A", -1), card("c", "B", 0)];
        let summary = summary(&scores);
        assert_eq!(summary.participants, 3);
        assert_eq!(summary.leader_net_score, Some(-1));
        assert_eq!(summary.average_net_score, Some(0.3));
        assert_eq!(summary.groups, 2);
    }

    proptest! {
        #[test]
        fn rank_is_sorted_and_repeatable(nets in prop::collection::vec(-10i32..10, 0..30)) {
            let scores: Vec<PlayerScore> = nets
                .iter()
                .enumerate()
                .map(|(i, net)| card(&format!("p{i}"), "A", *net))
                .collect();

            let ranked = rank(&scores);
            prop_assert_eq!(ranked.len(), scores.len());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].net_score() <= pair[1].net_score());
            }
            prop_assert_eq!(rank(&scores), ranked);
        }
    }
}
