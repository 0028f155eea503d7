//! Group and match models.
//!
//! A group is a triple of same-category pairs playing a round-robin
//! mini-league: three matches, one per unordered member pair. Both are
//! plain value records that refer to pairs by id.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SlotToken;

/// Number of pairs in a group.
pub const GROUP_SIZE: usize = 3;

/// Number of matches a group plays.
pub const MATCHES_PER_GROUP: usize = 3;

/// Compatibility score of a triple.
///
/// Serialized as its numeric value (`3.0`, `2.0`, `0.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum GroupScore {
    /// No member shares a slot with another.
    Incompatible,
    /// At least two members share a slot, but not all three.
    Partial,
    /// All three members share a slot.
    Perfect,
}

impl GroupScore {
    /// Integer score points (0, 2 or 3).
    #[inline]
    pub fn points(self) -> u32 {
        match self {
            GroupScore::Incompatible => 0,
            GroupScore::Partial => 2,
            GroupScore::Perfect => 3,
        }
    }

    /// Score as reported (0.0, 2.0 or 3.0).
    #[inline]
    pub fn value(self) -> f64 {
        self.points() as f64
    }

    /// Highest score a single group can reach.
    pub const MAX_POINTS: u32 = 3;
}

impl From<GroupScore> for f64 {
    fn from(score: GroupScore) -> Self {
        score.value()
    }
}

impl TryFrom<f64> for GroupScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 3.0 {
            Ok(GroupScore::Perfect)
        } else if value == 2.0 {
            Ok(GroupScore::Partial)
        } else if value == 0.0 {
            Ok(GroupScore::Incompatible)
        } else {
            Err(format!("invalid group score {value}"))
        }
    }
}

impl fmt::Display for GroupScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// A formed group of three pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Run-wide group number, 1-based.
    pub id: u32,
    pub category: String,
    /// Member pair ids in roster order.
    pub members: [String; GROUP_SIZE],
    /// Slot the group's matches are anchored to.
    pub common_slot: Option<SlotToken>,
    pub score: GroupScore,
    /// Member left out of the common slot when the score is partial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncovered: Option<String>,
}

impl Group {
    /// Whether a pair is a member.
    pub fn contains(&self, pair_id: &str) -> bool {
        self.members.iter().any(|m| m == pair_id)
    }

    /// Position of a member (0..3).
    pub fn position_of(&self, pair_id: &str) -> Option<usize> {
        self.members.iter().position(|m| m == pair_id)
    }
}

/// One round-robin match between two members of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// `"{group_id}-{sequence}"`.
    pub id: String,
    pub group_id: u32,
    pub pair_a: String,
    pub pair_b: String,
    /// Scheduling anchor, copied from the group's common slot.
    pub slot: Option<SlotToken>,
    /// Generation order within the group (0..3).
    pub sequence: u8,
}

impl Match {
    /// Whether a pair plays in this match.
    pub fn involves(&self, pair_id: &str) -> bool {
        self.pair_a == pair_id || self.pair_b == pair_id
    }
}
