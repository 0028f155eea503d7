//! Court and sub-slot placement.
//!
//! # Algorithm
//!
//! 1. Matches are gathered per group, keeping the order groups were
//!    produced in.
//! 2. Each group is anchored on its common slot. The k-th group (0-based)
//!    anchored on a slot gets `court = k % courts` and sub-slot block
//!    `k / courts`.
//! 3. Match `i` of a group is placed on sub-slot `3 * block + i` of that
//!    court, so a group plays its whole round on one court.
//! 4. A group whose block does not exist under the [`OverflowPolicy`] is
//!    reported as a [`ConflictReason::CapacityExceeded`] conflict; a group
//!    with no common slot as [`ConflictReason::NoCommonSlot`]. Its matches
//!    are listed as unplaced.
//!
//! Entries are finally ordered by (slot, sub-slot, court).
//!
//! Two groups on the same slot and sub-slot always use different courts,
//! and a group's matches use distinct sub-slots, so neither a court nor a
//! pair (which belongs to one group only) is ever double-booked.

use std::collections::HashMap;

use tracing::warn;

use crate::config::{EngineConfig, OverflowPolicy, SUB_SLOTS_PER_ROUND};
use crate::models::{
    Calendar, CalendarEntry, ConflictReason, Match, SchedulingConflict, SlotToken,
};

/// Places matches onto courts and sub-slots.
#[derive(Debug, Clone)]
pub struct CalendarBuilder {
    court_count: usize,
    blocks_per_slot: usize,
    policy: OverflowPolicy,
}

impl CalendarBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            court_count: config.court_count,
            blocks_per_slot: config.blocks_per_slot(),
            policy: config.overflow_policy,
        }
    }

    /// Groups one slot can host.
    pub fn capacity(&self) -> usize {
        self.court_count * self.blocks_per_slot
    }

    /// Builds the calendar for all matches of a run.
    ///
    /// Groups are ranked by the first appearance of any of their matches.
    pub fn build(&self, matches: &[Match]) -> Calendar {
        let rounds = gather_rounds(matches);

        let mut demand: HashMap<SlotToken, usize> = HashMap::new();
        for round in &rounds {
            if let Some(slot) = round.slot {
                *demand.entry(slot).or_insert(0) += 1;
            }
        }

        let mut calendar = Calendar::new();
        let mut next_rank: HashMap<SlotToken, usize> = HashMap::new();

        for round in rounds {
            let Some(slot) = round.slot else {
                warn!(group_id = round.group_id, "group has no common slot");
                calendar.add_conflict(round.into_conflict(ConflictReason::NoCommonSlot));
                continue;
            };

            let rank = next_rank.entry(slot).or_insert(0);
            let k = *rank;
            *rank += 1;

            let court = k % self.court_count.max(1);
            let block = k / self.court_count.max(1);

            if block >= self.blocks_per_slot {
                let groups_in_slot = demand.get(&slot).copied().unwrap_or(0);
                warn!(
                    group_id = round.group_id,
                    slot = slot.index(),
                    groups_in_slot,
                    capacity = self.capacity(),
                    policy = ?self.policy,
                    "slot over capacity"
                );
                calendar.add_conflict(round.into_conflict(ConflictReason::CapacityExceeded {
                    slot,
                    groups_in_slot,
                    capacity: self.capacity(),
                }));
                continue;
            }

            for m in &round.matches {
                let sub_slot = SUB_SLOTS_PER_ROUND * block + m.sequence as usize;
                calendar.add_entry(CalendarEntry::new(m, slot, sub_slot, court));
            }
        }

        calendar.sort_entries();
        calendar
    }
}

/// One group's matches.
struct Round {
    group_id: u32,
    slot: Option<SlotToken>,
    matches: Vec<Match>,
}

impl Round {
    fn into_conflict(self, reason: ConflictReason) -> SchedulingConflict {
        SchedulingConflict {
            group_id: self.group_id,
            reason,
            unplaced: self.matches,
        }
    }
}

fn gather_rounds(matches: &[Match]) -> Vec<Round> {
    let mut rounds: Vec<Round> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for m in matches {
        let i = *index.entry(m.group_id).or_insert_with(|| {
            rounds.push(Round {
                group_id: m.group_id,
                slot: m.slot,
                matches: Vec::new(),
            });
            rounds.len() - 1
        });
        rounds[i].matches.push(m.clone());
    }

    for round in &mut rounds {
        round.matches.sort_by_key(|m| m.sequence);
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, GroupScore};
    use crate::scheduler::MatchGenerator;

    fn group(id: u32, slot: Option<usize>) -> Group {
        let base = (id - 1) * 3;
        Group {
            id,
            category: "Cuarta".into(),
            members: [
                format!("P{}", base + 1),
                format!("P{}", base + 2),
                format!("P{}", base + 3),
            ],
            common_slot: slot.map(SlotToken::new),
            score: GroupScore::Perfect,
            uncovered: None,
        }
    }

    fn build(config: &EngineConfig, groups: &[Group]) -> Calendar {
        CalendarBuilder::new(config).build(&MatchGenerator::for_groups(groups))
    }

    #[test]
    fn test_single_group() {
        let calendar = build(&EngineConfig::default(), &[group(1, Some(3))]);
        assert!(calendar.is_complete());
        assert_eq!(calendar.entry_count(), 3);
        for (i, e) in calendar.entries.iter().enumerate() {
            assert_eq!(e.slot, SlotToken::new(3));
            assert_eq!(e.sub_slot, i);
            assert_eq!(e.court, 0);
        }
    }

    #[test]
    fn test_round_robin_courts() {
        let config = EngineConfig::default().with_court_count(2);
        let calendar = build(&config, &[group(1, Some(0)), group(2, Some(0)), group(3, Some(1))]);
        assert!(calendar.is_complete());

        let court_of = |gid: u32| calendar.entries_for_group(gid)[0].court;
        assert_eq!(court_of(1), 0);
        assert_eq!(court_of(2), 1);
        assert_eq!(court_of(3), 0); // counter is per slot
        assert!(calendar.find_violations().is_empty());
    }

    #[test]
    fn test_overflow_next_block() {
        // one court, two groups on the same slot
        let config = EngineConfig::default()
            .with_court_count(1)
            .with_sub_slots(6)
            .with_overflow_policy(OverflowPolicy::NextSubSlotBlock);
        let calendar = build(&config, &[group(1, Some(0)), group(2, Some(0))]);

        assert!(calendar.is_complete());
        let subs: Vec<usize> = calendar.entries_for_group(2).iter().map(|e| e.sub_slot).collect();
        assert_eq!(subs, vec![3, 4, 5]);
        assert!(calendar.find_violations().is_empty());
    }

    #[test]
    fn test_overflow_next_block_without_room() {
        // default 3 sub-slots leave no second block
        let config = EngineConfig::default().with_court_count(1);
        let calendar = build(&config, &[group(1, Some(0)), group(2, Some(0))]);

        assert_eq!(calendar.entry_count(), 3);
        assert_eq!(calendar.conflicts.len(), 1);
        let conflict = &calendar.conflicts[0];
        assert_eq!(conflict.group_id, 2);
        assert_eq!(conflict.unplaced.len(), 3);
        assert_eq!(
            conflict.reason,
            ConflictReason::CapacityExceeded {
                slot: SlotToken::new(0),
                groups_in_slot: 2,
                capacity: 1,
            }
        );
    }

    #[test]
    fn test_overflow_reject() {
        let config = EngineConfig::default()
            .with_court_count(1)
            .with_sub_slots(6)
            .with_overflow_policy(OverflowPolicy::Reject);
        let calendar = build(&config, &[group(1, Some(0)), group(2, Some(0))]);

        assert_eq!(calendar.entry_count(), 3);
        assert_eq!(calendar.unplaced_count(), 3);
        assert!(calendar.entries.iter().all(|e| e.group_id == 1));
        assert_eq!(calendar.conflicts[0].group_id, 2);
    }

    #[test]
    fn test_no_common_slot() {
        let calendar = build(&EngineConfig::default(), &[group(1, None), group(2, Some(1))]);
        assert_eq!(calendar.entry_count(), 3);
        assert_eq!(calendar.conflicts.len(), 1);
        assert_eq!(calendar.conflicts[0].reason, ConflictReason::NoCommonSlot);
    }

    #[test]
    fn test_entries_sorted() {
        let config = EngineConfig::default().with_court_count(2);
        let calendar = build(&config, &[group(1, Some(5)), group(2, Some(1)), group(3, Some(1))]);
        let keys: Vec<(usize, usize, usize)> = calendar
            .entries
            .iter()
            .map(|e| (e.slot.index(), e.sub_slot, e.court))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(calendar.entries[0].group_id, 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: no court and no pair is double-booked, and every
            /// match is either placed or reported.
            #[test]
            fn prop_no_double_booking(
                slots in proptest::collection::vec(proptest::option::weighted(0.9, 0usize..4), 1..20),
                courts in 1usize..4,
                sub_slots in 3usize..10,
                reject in any::<bool>(),
            ) {
                let policy = if reject { OverflowPolicy::Reject } else { OverflowPolicy::NextSubSlotBlock };
                let config = EngineConfig::default()
                    .with_court_count(courts)
                    .with_sub_slots(sub_slots)
                    .with_overflow_policy(policy);
                let groups: Vec<Group> = slots
                    .iter()
                    .enumerate()
                    .map(|(i, s)| group(i as u32 + 1, *s))
                    .collect();

                let calendar = build(&config, &groups);
                prop_assert!(calendar.find_violations().is_empty());
                prop_assert_eq!(calendar.entry_count() + calendar.unplaced_count(), groups.len() * 3);
                for e in &calendar.entries {
                    prop_assert!(e.court < courts);
                    prop_assert!(e.sub_slot < sub_slots);
                }
            }
        }
    }
}
