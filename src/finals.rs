//! Knockout finals built from completed group tables.
//!
//! # Bracket size
//!
//! | Groups  | First round     | Entrants                         |
//! |---------|-----------------|----------------------------------|
//! | 1       | Semi-finals     | all three, the winner gets a bye |
//! | 2..=3   | Semi-finals     | group winners, best runners-up   |
//! | 4..=7   | Quarter-finals  | group winners, best runners-up   |
//! | 8..=16  | Round of 16     | group winners, best runners-up   |
//!
//! # Seeding
//!
//! Group winners take the top seeds in group order. Runners-up follow,
//! then thirds, each tier ranked by matches, sets and games won (ties keep
//! group order). Seed `s` of an `n`-slot round meets seed `n + 1 - s`,
//! with the halves of the draw nested so that the top two seeds can only
//! meet in the final. A missing seed is a bye and its opponent advances.
//!
//! First-round opponents from the same group are swapped with another
//! match's away side whenever that creates no new same-group match.
//!
//! # Progression
//!
//! Match `i` of a round feeds match `i / 2` of the next one, as home side
//! when `i` is even. Changing a recorded winner replaces the entrant
//! downstream and clears every result that depended on it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::models::{ResultSet, GROUP_SIZE};
use crate::standings::{GroupStandings, MatchResult, StandingRow};

/// Knockout round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Phase {
    /// First round for a category with `groups` groups.
    pub fn for_group_count(groups: usize) -> Option<Self> {
        match groups {
            0 => None,
            1..=3 => Some(Phase::SemiFinal),
            4..=7 => Some(Phase::QuarterFinal),
            8..=16 => Some(Phase::RoundOf16),
            _ => None,
        }
    }

    /// Matches played in this round.
    pub fn matches(self) -> usize {
        match self {
            Phase::RoundOf16 => 8,
            Phase::QuarterFinal => 4,
            Phase::SemiFinal => 2,
            Phase::Final => 1,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Phase::RoundOf16 => Some(Phase::QuarterFinal),
            Phase::QuarterFinal => Some(Phase::SemiFinal),
            Phase::SemiFinal => Some(Phase::Final),
            Phase::Final => None,
        }
    }

    /// Short code used in match ids.
    pub fn code(self) -> &'static str {
        match self {
            Phase::RoundOf16 => "r16",
            Phase::QuarterFinal => "qf",
            Phase::SemiFinal => "sf",
            Phase::Final => "final",
        }
    }
}

/// Where a bracket slot gets its pair from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotSource {
    /// Finishing position (1-based) in a group.
    Qualifier {
        #[serde(rename = "groupId")]
        group_id: u32,
        position: usize,
    },
    /// Winner of an earlier finals match.
    WinnerOf {
        #[serde(rename = "matchId")]
        match_id: String,
    },
    Bye,
}

/// One side of a finals match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSlot {
    pub source: SlotSource,
    /// Known once the source is decided.
    pub pair_id: Option<String>,
}

impl BracketSlot {
    fn bye() -> Self {
        Self {
            source: SlotSource::Bye,
            pair_id: None,
        }
    }

    fn winner_of(match_id: &str) -> Self {
        Self {
            source: SlotSource::WinnerOf {
                match_id: match_id.to_string(),
            },
            pair_id: None,
        }
    }

    fn group_id(&self) -> Option<u32> {
        match self.source {
            SlotSource::Qualifier { group_id, .. } => Some(group_id),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.source == SlotSource::Bye
    }
}

/// A knockout match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalMatch {
    /// `"{category}/{phase code}-{number}"`, or `"{category}/final"`.
    pub id: String,
    pub phase: Phase,
    /// 1-based position within the round.
    pub number: usize,
    pub home: BracketSlot,
    pub away: BracketSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

impl FinalMatch {
    fn new(category: &str, phase: Phase, number: usize, home: BracketSlot, away: BracketSlot) -> Self {
        let id = match phase {
            Phase::Final => format!("{category}/final"),
            _ => format!("{category}/{}-{number}", phase.code()),
        };
        Self {
            id,
            phase,
            number,
            home,
            away,
            winner: None,
        }
    }

    /// Both pairs, once known.
    pub fn entrants(&self) -> Option<(&str, &str)> {
        Some((self.home.pair_id.as_deref()?, self.away.pair_id.as_deref()?))
    }

    pub fn involves(&self, pair_id: &str) -> bool {
        self.home.pair_id.as_deref() == Some(pair_id) || self.away.pair_id.as_deref() == Some(pair_id)
    }

    fn same_group(&self) -> bool {
        same_group(&self.home, &self.away)
    }
}

/// Knockout bracket of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub category: String,
    /// Rounds from the first one to the final.
    pub rounds: Vec<Vec<FinalMatch>>,
}

/// A group finisher eligible for the bracket.
struct Qualifier<'a> {
    group_id: u32,
    position: usize,
    row: &'a StandingRow,
}

impl Qualifier<'_> {
    fn record(&self) -> (u32, u32, u32) {
        (self.row.won, self.row.sets_won, self.row.games_won)
    }

    fn slot(&self) -> BracketSlot {
        BracketSlot {
            source: SlotSource::Qualifier {
                group_id: self.group_id,
                position: self.position,
            },
            pair_id: Some(self.row.pair_id.clone()),
        }
    }
}

impl Bracket {
    /// Seeds a bracket from the category's completed group tables.
    ///
    /// # Errors
    /// - [`EngineError::NoGroups`] when `standings` is empty
    /// - [`EngineError::TooManyGroups`] past 16 groups
    /// - [`EngineError::IncompleteGroup`] when a table is not complete
    pub fn build(category: &str, standings: &[GroupStandings]) -> Result<Self, EngineError> {
        if standings.is_empty() {
            return Err(EngineError::NoGroups {
                category: category.to_string(),
            });
        }
        let first = Phase::for_group_count(standings.len()).ok_or_else(|| {
            EngineError::TooManyGroups {
                category: category.to_string(),
                groups: standings.len(),
            }
        })?;

        let mut tiers: Vec<Vec<Qualifier<'_>>> = (0..GROUP_SIZE).map(|_| Vec::new()).collect();
        for table in standings {
            if !table.is_complete() {
                return Err(EngineError::IncompleteGroup {
                    group_id: table.group_id,
                });
            }
            for (i, row) in table.rows.iter().take(GROUP_SIZE).enumerate() {
                tiers[i].push(Qualifier {
                    group_id: table.group_id,
                    position: i + 1,
                    row,
                });
            }
        }
        for tier in tiers.iter_mut().skip(1) {
            // stable: equal records keep group order
            tier.sort_by(|x, y| y.record().cmp(&x.record()));
        }

        let size = 2 * first.matches();
        let seeds: Vec<Qualifier<'_>> = tiers.into_iter().flatten().take(size).collect();
        let order = seed_order(size);

        let mut opening: Vec<FinalMatch> = order
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| {
                let slot = |seed: usize| seeds.get(seed - 1).map_or_else(BracketSlot::bye, Qualifier::slot);
                FinalMatch::new(category, first, i + 1, slot(pair[0]), slot(pair[1]))
            })
            .collect();
        separate_groups(&mut opening);

        let mut rounds = vec![opening];
        let mut phase = first;
        while let Some(next) = phase.next() {
            let previous = &rounds[rounds.len() - 1];
            let matches = previous
                .chunks(2)
                .enumerate()
                .map(|(i, feeders)| {
                    FinalMatch::new(
                        category,
                        next,
                        i + 1,
                        BracketSlot::winner_of(&feeders[0].id),
                        BracketSlot::winner_of(&feeders[1].id),
                    )
                })
                .collect();
            rounds.push(matches);
            phase = next;
        }

        let mut bracket = Self {
            category: category.to_string(),
            rounds,
        };
        bracket.advance_byes();

        info!(
            category,
            groups = standings.len(),
            entrants = seeds.len(),
            first_round = first.code(),
            "finals bracket built"
        );
        Ok(bracket)
    }

    /// Builds the bracket of `category` from an engine result and the
    /// reported group-stage results.
    ///
    /// Results whose pairs belong to no group of the category are ignored.
    pub fn from_results(
        result: &ResultSet,
        category: &str,
        results: &[MatchResult],
    ) -> Result<Self, EngineError> {
        let groups = result
            .groups_by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let standings = groups
            .iter()
            .map(|group| {
                let own: Vec<MatchResult> = results
                    .iter()
                    .filter(|r| group.contains(&r.pair_a) || group.contains(&r.pair_b))
                    .cloned()
                    .collect();
                GroupStandings::compute(group, &own)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::build(category, &standings)
    }

    /// Records the winner of a match and moves them on.
    pub fn record_winner(&mut self, match_id: &str, pair_id: &str) -> Result<(), EngineError> {
        let (round, index) = self.ready_match(match_id)?;
        let m = &self.rounds[round][index];
        if !m.involves(pair_id) {
            return Err(EngineError::NotInMatch {
                match_id: match_id.to_string(),
                pair_id: pair_id.to_string(),
            });
        }

        self.set_winner(round, index, pair_id.to_string());
        info!(match_id, winner = pair_id, "finals result recorded");
        Ok(())
    }

    /// Records a scored result. Both of its pairs must be the entrants.
    pub fn record_result(&mut self, match_id: &str, result: &MatchResult) -> Result<(), EngineError> {
        let (round, index) = self.ready_match(match_id)?;
        let m = &self.rounds[round][index];
        if let Some(stranger) = [&result.pair_a, &result.pair_b]
            .into_iter()
            .find(|p| !m.involves(p))
        {
            return Err(EngineError::NotInMatch {
                match_id: match_id.to_string(),
                pair_id: stranger.clone(),
            });
        }

        let winner = result.winner().ok_or_else(|| EngineError::UndecidedResult {
            match_id: match_id.to_string(),
        })?;
        self.record_winner(match_id, winner)
    }

    /// Winner of the final.
    pub fn champion(&self) -> Option<&str> {
        self.rounds.last()?.first()?.winner.as_deref()
    }

    pub fn find(&self, match_id: &str) -> Option<&FinalMatch> {
        self.matches().find(|m| m.id == match_id)
    }

    /// All matches, round by round.
    pub fn matches(&self) -> impl Iterator<Item = &FinalMatch> + '_ {
        self.rounds.iter().flatten()
    }

    pub fn first_round(&self) -> &[FinalMatch] {
        self.rounds.first().map(Vec::as_slice).unwrap_or(&[])
    }

    fn locate(&self, match_id: &str) -> Option<(usize, usize)> {
        self.rounds.iter().enumerate().find_map(|(r, round)| {
            round
                .iter()
                .position(|m| m.id == match_id)
                .map(|i| (r, i))
        })
    }

    fn ready_match(&self, match_id: &str) -> Result<(usize, usize), EngineError> {
        let (round, index) = self.locate(match_id).ok_or_else(|| EngineError::UnknownMatch {
            match_id: match_id.to_string(),
        })?;
        if self.rounds[round][index].entrants().is_none() {
            return Err(EngineError::MatchNotReady {
                match_id: match_id.to_string(),
            });
        }
        Ok((round, index))
    }

    fn advance_byes(&mut self) {
        let walkovers: Vec<(usize, String)> = self
            .first_round()
            .iter()
            .enumerate()
            .filter_map(|(i, m)| match (m.home.is_bye(), m.away.is_bye()) {
                (false, true) => m.home.pair_id.clone().map(|p| (i, p)),
                (true, false) => m.away.pair_id.clone().map(|p| (i, p)),
                _ => None,
            })
            .collect();

        for (index, pair_id) in walkovers {
            debug!(pair_id = %pair_id, "bye");
            self.set_winner(0, index, pair_id);
        }
    }

    fn set_winner(&mut self, round: usize, index: usize, winner: String) {
        self.rounds[round][index].winner = Some(winner.clone());
        self.fill_next(round, index, Some(winner));
    }

    /// Puts `pair_id` into the slot fed by match `index` of `round`.
    fn fill_next(&mut self, round: usize, index: usize, pair_id: Option<String>) {
        let Some(next) = self.rounds.get_mut(round + 1) else {
            return;
        };
        let m = &mut next[index / 2];
        let slot = if index % 2 == 0 { &mut m.home } else { &mut m.away };
        if slot.pair_id == pair_id {
            return;
        }
        slot.pair_id = pair_id;

        if m.winner.take().is_some() {
            debug!(match_id = %m.id, "entrant changed, result cleared");
            self.fill_next(round + 1, index / 2, None);
        }
    }
}

/// Seed numbers (1-based) in draw order for `size` slots, a power of two.
/// Consecutive entries meet in the first round.
fn seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = 2 * order.len() + 1;
        order = order.iter().flat_map(|&s| [s, n - s]).collect();
    }
    order
}

fn same_group(a: &BracketSlot, b: &BracketSlot) -> bool {
    matches!((a.group_id(), b.group_id()), (Some(x), Some(y)) if x == y)
}

/// Swaps away sides so group mates avoid each other where possible.
fn separate_groups(matches: &mut [FinalMatch]) {
    for i in 0..matches.len() {
        if !matches[i].same_group() {
            continue;
        }
        let partner = (0..matches.len()).find(|&j| {
            j != i
                && !same_group(&matches[i].home, &matches[j].away)
                && !same_group(&matches[j].home, &matches[i].away)
        });
        if let Some(j) = partner {
            let away = matches[i].away.clone();
            matches[i].away = std::mem::replace(&mut matches[j].away, away);
        }
    }
}
