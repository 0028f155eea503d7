//! Round-robin match generation.

use crate::models::{Group, Match, MATCHES_PER_GROUP};

/// Member positions of each match, in generation order.
const PAIRINGS: [(usize, usize); MATCHES_PER_GROUP] = [(0, 1), (0, 2), (1, 2)];

/// Expands groups into their round-robin matches.
///
/// For members `[A, B, C]` the matches are `(A, B)`, `(A, C)`, `(B, C)`,
/// each anchored on the group's common slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchGenerator;

impl MatchGenerator {
    /// The three matches of one group.
    pub fn for_group(group: &Group) -> Vec<Match> {
        PAIRINGS
            .iter()
            .enumerate()
            .map(|(sequence, &(a, b))| Match {
                id: format!("{}-{sequence}", group.id),
                group_id: group.id,
                pair_a: group.members[a].clone(),
                pair_b: group.members[b].clone(),
                slot: group.common_slot,
                sequence: sequence as u8,
            })
            .collect()
    }

    /// Matches of all groups, in group order.
    pub fn for_groups<'a>(groups: impl IntoIterator<Item = &'a Group>) -> Vec<Match> {
        groups.into_iter().flat_map(Self::for_group).collect()
    }
}
