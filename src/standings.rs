//! Group standings from match results.
//!
//! Once a group's round-robin has been played, its table is derived from
//! the reported results.
//!
//! # Ranking
//!
//! 1. Matches won
//! 2. Sets won
//! 3. Games won
//!
//! all descending, with remaining ties kept in member order. A super
//! tie-break decides a match at one set each but counts neither as a set
//! nor as games.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Group, GROUP_SIZE, MATCHES_PER_GROUP};

/// Games of one set (or of a super tie-break), from each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub a: u32,
    pub b: u32,
}

impl SetScore {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }
}

/// Reported result of a match between two group members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub pair_a: String,
    pub pair_b: String,
    pub sets: Vec<SetScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_tiebreak: Option<SetScore>,
}

impl MatchResult {
    pub fn new(pair_a: impl Into<String>, pair_b: impl Into<String>) -> Self {
        Self {
            pair_a: pair_a.into(),
            pair_b: pair_b.into(),
            sets: Vec::new(),
            super_tiebreak: None,
        }
    }

    /// Adds a set.
    pub fn with_set(mut self, a: u32, b: u32) -> Self {
        self.sets.push(SetScore::new(a, b));
        self
    }

    /// Sets the super tie-break.
    pub fn with_super_tiebreak(mut self, a: u32, b: u32) -> Self {
        self.super_tiebreak = Some(SetScore::new(a, b));
        self
    }

    /// Sets won by each side. Level sets count for nobody.
    pub fn sets_won(&self) -> (u32, u32) {
        self.sets.iter().fold((0, 0), |(a, b), s| match s.a.cmp(&s.b) {
            std::cmp::Ordering::Greater => (a.saturating_add(1), b),
            std::cmp::Ordering::Less => (a, b.saturating_add(1)),
            std::cmp::Ordering::Equal => (a, b),
        })
    }

    /// Games won by each side, tie-break excluded. Saturates at `u32::MAX`.
    pub fn games_won(&self) -> (u32, u32) {
        self.sets.iter().fold((0, 0), |(a, b), s| {
            (a.saturating_add(s.a), b.saturating_add(s.b))
        })
    }

    /// Winning pair id, or `None` while the result is undecided.
    pub fn winner(&self) -> Option<&str> {
        let (a, b) = self.sets_won();
        if a > b {
            return Some(self.pair_a.as_str());
        }
        if b > a {
            return Some(self.pair_b.as_str());
        }
        match self.super_tiebreak {
            Some(tb) if a > 0 && tb.a > tb.b => Some(self.pair_a.as_str()),
            Some(tb) if a > 0 && tb.b > tb.a => Some(self.pair_b.as_str()),
            _ => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner().is_some()
    }
}

/// One row of a group table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub pair_id: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
}

impl StandingRow {
    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn game_difference(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}

/// Table of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStandings {
    pub group_id: u32,
    /// Ranked rows.
    pub rows: Vec<StandingRow>,
    /// Matchups with a decisive result.
    pub decided_matches: usize,
}

impl GroupStandings {
    /// Builds the table of `group` from `results`.
    ///
    /// Undecided results are skipped. When a matchup is reported more than
    /// once, the last report counts. A result naming a pair outside the
    /// group is an error.
    pub fn compute(group: &Group, results: &[MatchResult]) -> Result<Self, EngineError> {
        let mut latest: BTreeMap<(usize, usize), &MatchResult> = BTreeMap::new();

        for result in results {
            let a = position(group, &result.pair_a)?;
            let b = position(group, &result.pair_b)?;
            if a != b {
                latest.insert((a.min(b), a.max(b)), result);
            }
        }

        let mut rows: Vec<StandingRow> = group
            .members
            .iter()
            .map(|id| StandingRow {
                pair_id: id.clone(),
                ..StandingRow::default()
            })
            .collect();
        let mut decided_matches = 0;

        for result in latest.values() {
            let Some(winner) = result.winner() else {
                continue;
            };
            decided_matches += 1;

            let a = position(group, &result.pair_a)?;
            let b = position(group, &result.pair_b)?;
            let (winner, loser) = if winner == result.pair_a { (a, b) } else { (b, a) };
            let (sets_a, sets_b) = result.sets_won();
            let (games_a, games_b) = result.games_won();

            rows[winner].won = rows[winner].won.saturating_add(1);
            rows[loser].lost = rows[loser].lost.saturating_add(1);
            for (me, sets, games, other_sets, other_games) in [
                (a, sets_a, games_a, sets_b, games_b),
                (b, sets_b, games_b, sets_a, games_a),
            ] {
                let row = &mut rows[me];
                row.played = row.played.saturating_add(1);
                row.sets_won = row.sets_won.saturating_add(sets);
                row.sets_lost = row.sets_lost.saturating_add(other_sets);
                row.games_won = row.games_won.saturating_add(games);
                row.games_lost = row.games_lost.saturating_add(other_games);
            }
        }

        // stable: ties keep member order
        rows.sort_by(|x, y| {
            (y.won, y.sets_won, y.games_won).cmp(&(x.won, x.sets_won, x.games_won))
        });

        Ok(Self {
            group_id: group.id,
            rows,
            decided_matches,
        })
    }

    /// Whether every match of the group has a decisive result.
    pub fn is_complete(&self) -> bool {
        self.decided_matches == MATCHES_PER_GROUP
    }

    /// Final positions (1..=3) by pair id, once the group is complete.
    pub fn positions(&self) -> Option<Vec<(usize, &str)>> {
        if !self.is_complete() {
            return None;
        }
        Some(
            self.rows
                .iter()
                .take(GROUP_SIZE)
                .enumerate()
                .map(|(i, row)| (i + 1, row.pair_id.as_str()))
                .collect(),
        )
    }

    /// Row of a pair.
    pub fn row(&self, pair_id: &str) -> Option<&StandingRow> {
        self.rows.iter().find(|r| r.pair_id == pair_id)
    }
}

fn position(group: &Group, pair_id: &str) -> Result<usize, EngineError> {
    group
        .position_of(pair_id)
        .ok_or_else(|| EngineError::UnknownPair {
            group_id: group.id,
            pair_id: pair_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupScore, SlotToken};

    fn sample_group() -> Group {
        Group {
            id: 7,
            category: "Quinta".into(),
            members: ["A".into(), "B".into(), "C".into()],
            common_slot: Some(SlotToken::new(0)),
            score: GroupScore::Perfect,
            uncovered: None,
        }
    }

    #[test]
    fn test_winner_rules() {
        assert_eq!(MatchResult::new("A", "B").with_set(6, 3).with_set(6, 4).winner(), Some("A"));
        assert_eq!(MatchResult::new("A", "B").with_set(3, 6).with_set(4, 6).winner(), Some("B"));

        let split = MatchResult::new("A", "B").with_set(6, 3).with_set(4, 6);
        assert_eq!(split.winner(), None);
        assert_eq!(split.clone().with_super_tiebreak(8, 10).winner(), Some("B"));
        assert_eq!(MatchResult::new("A", "B").winner(), None);
    }

    #[test]
    fn test_tiebreak_not_counted() {
        let r = MatchResult::new("A", "B")
            .with_set(6, 3)
            .with_set(4, 6)
            .with_super_tiebreak(10, 7);
        assert_eq!(r.sets_won(), (1, 1));
        assert_eq!(r.games_won(), (10, 9));
    }

    #[test]
    fn test_complete_table() {
        let results = vec![
            MatchResult::new("A", "B").with_set(6, 2).with_set(6, 3),
            MatchResult::new("A", "C").with_set(3, 6).with_set(6, 4).with_super_tiebreak(10, 6),
            MatchResult::new("C", "B").with_set(6, 4).with_set(6, 4),
        ];
        let table = GroupStandings::compute(&sample_group(), &results).unwrap();

        assert!(table.is_complete());
        let order: Vec<&str> = table.rows.iter().map(|r| r.pair_id.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
        assert_eq!(table.positions(), Some(vec![(1, "A"), (2, "C"), (3, "B")]));

        let a = table.row("A").unwrap();
        assert_eq!((a.played, a.won, a.lost), (2, 2, 0));
        assert_eq!((a.sets_won, a.sets_lost), (3, 1));
        assert_eq!((a.games_won, a.games_lost), (21, 15));
        assert_eq!(a.set_difference(), 2);
        assert_eq!(a.game_difference(), 6);

        let b = table.row("B").unwrap();
        assert_eq!((b.won, b.lost, b.sets_won), (0, 2, 0));
    }

    #[test]
    fn test_ties_broken_by_sets_then_games() {
        // everyone wins once
        let results = vec![
            MatchResult::new("A", "B").with_set(6, 0).with_set(6, 0),
            MatchResult::new("B", "C").with_set(6, 4).with_set(6, 4),
            MatchResult::new("C", "A").with_set(6, 4).with_set(3, 6).with_super_tiebreak(10, 8),
        ];
        let table = GroupStandings::compute(&sample_group(), &results).unwrap();
        let order: Vec<&str> = table.rows.iter().map(|r| r.pair_id.as_str()).collect();
        // A: 3 sets, B: 2 sets, C: 1 set
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_incomplete_has_no_positions() {
        let results = vec![
            MatchResult::new("A", "B").with_set(6, 2).with_set(6, 3),
            MatchResult::new("A", "C").with_set(6, 2).with_set(6, 1),
            MatchResult::new("B", "C").with_set(6, 2).with_set(2, 6),
        ];
        let table = GroupStandings::compute(&sample_group(), &results).unwrap();
        assert_eq!(table.decided_matches, 2);
        assert!(table.positions().is_none());
        assert_eq!(table.row("B").unwrap().played, 1); // undecided match ignored
    }

    #[test]
    fn test_last_report_wins() {
        let results = vec![
            MatchResult::new("A", "B").with_set(6, 2).with_set(6, 3),
            MatchResult::new("B", "A").with_set(6, 2).with_set(6, 3),
        ];
        let table = GroupStandings::compute(&sample_group(), &results).unwrap();
        assert_eq!(table.decided_matches, 1);
        assert_eq!(table.rows[0].pair_id, "B");
    }

    #[test]
    fn test_unknown_pair() {
        let results = vec![MatchResult::new("A", "Z").with_set(6, 0).with_set(6, 0)];
        let err = GroupStandings::compute(&sample_group(), &results).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownPair { group_id: 7, ref pair_id } if pair_id == "Z"
        ));
    }

    #[test]
    fn test_huge_scores_saturate() {
        let big = MatchResult::new("A", "B")
            .with_set(u32::MAX, 0)
            .with_set(u32::MAX, 1);
        assert_eq!(big.games_won(), (u32::MAX, 1));
        assert_eq!(big.winner(), Some("A"));

        let results = vec![
            big,
            MatchResult::new("A", "C").with_set(u32::MAX, 0).with_set(6, 0),
            MatchResult::new("B", "C").with_set(6, 0).with_set(6, 0),
        ];
        let table = GroupStandings::compute(&sample_group(), &results).unwrap();
        let a = table.row("A").unwrap();
        assert_eq!(a.games_won, u32::MAX);
        assert_eq!(a.game_difference(), i64::from(u32::MAX) - 1);
        assert_eq!(table.positions(), Some(vec![(1, "A"), (2, "B"), (3, "C")]));
    }

    #[test]
    fn test_json_shape() {
        let r: MatchResult = serde_json::from_str(
            r#"{"pairA": "A", "pairB": "B", "sets": [{"a": 6, "b": 1}, {"a": 6, "b": 2}]}"#,
        )
        .unwrap();
        assert_eq!(r.super_tiebreak, None);
        assert_eq!(r.winner(), Some("A"));
    }
}
