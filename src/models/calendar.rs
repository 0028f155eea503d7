//! Calendar (placement) model.
//!
//! A calendar binds matches to concrete (slot, sub-slot, court) cells.
//! Matches that cannot be placed are kept alongside as scheduling
//! conflicts so the caller can adjust court or slot capacity and retry.
//!
//! # Invariants
//! - At most one match per (slot, sub-slot, court).
//! - No pair plays twice in the same (slot, sub-slot).
//!
//! [`Calendar::find_violations`] audits both.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::{Match, SlotToken};

/// A match placed in a concrete calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub match_id: String,
    pub group_id: u32,
    pub pair_a: String,
    pub pair_b: String,
    pub slot: SlotToken,
    /// Sub-slot index within the slot.
    pub sub_slot: usize,
    /// Court index, 0-based.
    pub court: usize,
}

impl CalendarEntry {
    /// Binds a match to a cell.
    pub fn new(m: &Match, slot: SlotToken, sub_slot: usize, court: usize) -> Self {
        Self {
            match_id: m.id.clone(),
            group_id: m.group_id,
            pair_a: m.pair_a.clone(),
            pair_b: m.pair_b.clone(),
            slot,
            sub_slot,
            court,
        }
    }

    /// Whether a pair plays in this entry.
    pub fn involves(&self, pair_id: &str) -> bool {
        self.pair_a == pair_id || self.pair_b == pair_id
    }
}

/// Why a group's matches could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ConflictReason {
    /// More groups share the slot than courts × sub-slot blocks allow.
    #[serde(rename_all = "camelCase")]
    CapacityExceeded {
        slot: SlotToken,
        groups_in_slot: usize,
        capacity: usize,
    },
    /// The group has no common slot to anchor its matches.
    NoCommonSlot,
}

/// A group whose matches were left unplaced.
///
/// Non-fatal: carried in the calendar rather than returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("group {group_id} could not be scheduled: {reason:?}")]
pub struct SchedulingConflict {
    pub group_id: u32,
    pub reason: ConflictReason,
    /// The group's matches, none of which were placed.
    pub unplaced: Vec<Match>,
}

/// Result of calendar building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    /// Placed matches ordered by (slot, sub-slot, court).
    pub entries: Vec<CalendarEntry>,
    /// Groups that could not be placed.
    pub conflicts: Vec<SchedulingConflict>,
}

/// An invariant breach found by [`Calendar::find_violations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub violation_type: ViolationType,
    /// Offending court index or pair id.
    pub entity_id: String,
    pub message: String,
}

/// Classification of calendar violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationType {
    /// Two matches on one court in the same sub-slot.
    CourtDoubleBooked,
    /// A pair plays two matches in the same sub-slot.
    PairDoubleBooked,
}

impl Calendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placed entry.
    pub fn add_entry(&mut self, entry: CalendarEntry) {
        self.entries.push(entry);
    }

    /// Adds a conflict.
    pub fn add_conflict(&mut self, conflict: SchedulingConflict) {
        self.conflicts.push(conflict);
    }

    /// Whether every match was placed.
    pub fn is_complete(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of placed matches.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of matches left unplaced.
    pub fn unplaced_count(&self) -> usize {
        self.conflicts.iter().map(|c| c.unplaced.len()).sum()
    }

    /// Entry for a match id.
    pub fn entry_for_match(&self, match_id: &str) -> Option<&CalendarEntry> {
        self.entries.iter().find(|e| e.match_id == match_id)
    }

    /// All entries of a group.
    pub fn entries_for_group(&self, group_id: u32) -> Vec<&CalendarEntry> {
        self.entries
            .iter()
            .filter(|e| e.group_id == group_id)
            .collect()
    }

    /// All entries in a slot.
    pub fn entries_for_slot(&self, slot: SlotToken) -> Vec<&CalendarEntry> {
        self.entries.iter().filter(|e| e.slot == slot).collect()
    }

    /// Courts used per slot.
    pub fn courts_in_use(&self) -> HashMap<SlotToken, usize> {
        let mut courts: HashMap<SlotToken, HashSet<usize>> = HashMap::new();
        for e in &self.entries {
            courts.entry(e.slot).or_default().insert(e.court);
        }
        courts
            .into_iter()
            .map(|(slot, set)| (slot, set.len()))
            .collect()
    }

    /// Sorts entries by (slot, sub-slot, court).
    pub fn sort_entries(&mut self) {
        self.entries
            .sort_by(|a, b| (a.slot, a.sub_slot, a.court).cmp(&(b.slot, b.sub_slot, b.court)));
    }

    /// Audits the placement invariants.
    ///
    /// Returns an empty list for a valid calendar.
    pub fn find_violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut courts: HashSet<(SlotToken, usize, usize)> = HashSet::new();
        let mut pairs: HashSet<(SlotToken, usize, &str)> = HashSet::new();

        for e in &self.entries {
            if !courts.insert((e.slot, e.sub_slot, e.court)) {
                violations.push(Violation {
                    violation_type: ViolationType::CourtDoubleBooked,
                    entity_id: e.court.to_string(),
                    message: format!(
                        "court {} hosts more than one match in slot {}, sub-slot {}",
                        e.court,
                        e.slot.index(),
                        e.sub_slot
                    ),
                });
            }
            for pair in [e.pair_a.as_str(), e.pair_b.as_str()] {
                if !pairs.insert((e.slot, e.sub_slot, pair)) {
                    violations.push(Violation {
                        violation_type: ViolationType::PairDoubleBooked,
                        entity_id: pair.to_string(),
                        message: format!(
                            "pair {pair} plays twice in slot {}, sub-slot {}",
                            e.slot.index(),
                            e.sub_slot
                        ),
                    });
                }
            }
        }

        violations
    }
}
