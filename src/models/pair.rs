//! Pair (team) model.
//!
//! A pair is a two-player team scheduled as a single unit. Pairs are
//! immutable once a run starts; groups and matches refer to them by id.

use serde::{Deserialize, Serialize};

use super::{SlotCatalog, SlotSet, SlotToken};

/// A two-player team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    /// Unique caller-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Skill category; pairs are only grouped within one category.
    pub category: String,
    /// Slots this pair can play in.
    pub available_slots: SlotSet,
}

impl Pair {
    /// Creates a pair with no availability.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            available_slots: SlotSet::new(),
        }
    }

    /// Adds one available slot.
    pub fn with_slot(mut self, slot: SlotToken) -> Self {
        self.available_slots.insert(slot);
        self
    }

    /// Replaces the availability set.
    pub fn with_slots(mut self, slots: SlotSet) -> Self {
        self.available_slots = slots;
        self
    }

    /// Interns a label-based record against a slot catalog.
    ///
    /// Returns the first label the catalog does not know.
    pub fn from_record(record: &PairRecord, catalog: &SlotCatalog) -> Result<Self, String> {
        let slots = catalog.resolve(&record.available_slots)?;
        Ok(Self::new(&record.id, &record.name, &record.category).with_slots(slots))
    }

    /// Whether the pair shares at least one slot with another.
    pub fn shares_slot_with(&self, other: &Pair) -> bool {
        !self.available_slots.intersection(&other.available_slots).is_empty()
    }
}

/// Roster row as delivered by ingestion, with slots still as labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub available_slots: Vec<String>,
}
