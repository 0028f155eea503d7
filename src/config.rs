//! Engine configuration.
//!
//! Every field has a default matching a weekly padel league: four skill
//! categories, eight evening/weekend windows and two courts. Configs can
//! be built in code with the `with_*` methods or parsed from JSON, where
//! missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EngineError;
use crate::models::SlotCatalog;
use crate::validation;

/// Sub-slots one group needs for its full round.
pub const SUB_SLOTS_PER_ROUND: usize = 3;

/// How groups beyond the court count of a slot are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverflowPolicy {
    /// Push to the next block of three sub-slots in the same slot,
    /// reporting a conflict once the slot has no block left.
    #[default]
    NextSubSlotBlock,
    /// Only the first block is used; any further group is a conflict.
    Reject,
}

/// Limits on exact search.
///
/// The node limit is deterministic. The wall-time limit is not: two runs
/// may stop at different points, so leave it unset when reproducible
/// output matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchBudget {
    /// Maximum search nodes per category. `None` = unlimited.
    pub max_nodes: Option<u64>,
    /// Maximum wall time per category in milliseconds. `None` = unlimited.
    pub max_millis: Option<u64>,
}

impl SearchBudget {
    /// No limit at all.
    pub fn unlimited() -> Self {
        Self {
            max_nodes: None,
            max_millis: None,
        }
    }

    /// Node-count limit only.
    pub fn nodes(max_nodes: u64) -> Self {
        Self {
            max_nodes: Some(max_nodes),
            max_millis: None,
        }
    }

    /// Adds a wall-time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.max_millis = Some(limit.as_millis() as u64);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.max_millis.map(Duration::from_millis)
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::nodes(200_000)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Category labels in processing order.
    pub categories: Vec<String>,
    /// Slot labels; position = slot index.
    ///
    /// Each slot is an independent window: courts are booked per slot, so
    /// two labels must never cover overlapping hours.
    pub slots: Vec<String>,
    /// Courts available in every slot.
    pub court_count: usize,
    /// Sequential sub-slots per slot (at least 3).
    pub sub_slots_per_slot: usize,
    /// Exact search is used when the implied group count
    /// (`pairs / 3`) lies in `exact_search_min_groups..=exact_search_max_groups`.
    pub exact_search_min_groups: usize,
    pub exact_search_max_groups: usize,
    pub search_budget: SearchBudget,
    pub overflow_policy: OverflowPolicy,
    /// Form groups whose members share no slot at all. Off by default:
    /// such pairs stay unassigned instead.
    pub allow_incompatible_groups: bool,
}

/// Four categories, eight weekly windows, two courts.
///
/// Default windows start three hours apart on the same day, one hour per
/// sub-slot, so no two of them overlap.
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            categories: ["Cuarta", "Quinta", "Sexta", "Séptima"]
                .map(String::from)
                .to_vec(),
            slots: [
                "Jueves 18:00",
                "Jueves 21:00",
                "Viernes 18:00",
                "Viernes 21:00",
                "Sábado 09:00",
                "Sábado 12:00",
                "Sábado 15:00",
                "Sábado 18:00",
            ]
            .map(String::from)
            .to_vec(),
            court_count: 2,
            sub_slots_per_slot: SUB_SLOTS_PER_ROUND,
            exact_search_min_groups: 2,
            exact_search_max_groups: 6,
            search_budget: SearchBudget::default(),
            overflow_policy: OverflowPolicy::default(),
            allow_incompatible_groups: false,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the categories.
    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the slot labels.
    pub fn with_slots<S: Into<String>>(mut self, slots: impl IntoIterator<Item = S>) -> Self {
        self.slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the number of courts.
    pub fn with_court_count(mut self, courts: usize) -> Self {
        self.court_count = courts;
        self
    }

    /// Sets the number of sub-slots per slot.
    pub fn with_sub_slots(mut self, sub_slots: usize) -> Self {
        self.sub_slots_per_slot = sub_slots;
        self
    }

    /// Sets the group-count range that selects exact search.
    pub fn with_exact_search_range(mut self, min_groups: usize, max_groups: usize) -> Self {
        self.exact_search_min_groups = min_groups;
        self.exact_search_max_groups = max_groups;
        self
    }

    /// Sets the exact-search budget.
    pub fn with_search_budget(mut self, budget: SearchBudget) -> Self {
        self.search_budget = budget;
        self
    }

    /// Sets the court overflow policy.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Allows or forbids zero-score groups.
    pub fn with_incompatible_groups(mut self, allow: bool) -> Self {
        self.allow_incompatible_groups = allow;
        self
    }

    /// Builds the slot catalog.
    pub fn catalog(&self) -> SlotCatalog {
        SlotCatalog::new(&self.slots)
    }

    /// Whether a label is a configured category.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Blocks of three sub-slots per slot.
    pub fn blocks_per_slot(&self) -> usize {
        match self.overflow_policy {
            OverflowPolicy::NextSubSlotBlock => self.sub_slots_per_slot / SUB_SLOTS_PER_ROUND,
            OverflowPolicy::Reject => 1,
        }
    }

    /// Groups one slot can host.
    pub fn slot_capacity(&self) -> usize {
        self.court_count * self.blocks_per_slot()
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        validation::validate_config(self).map_err(EngineError::InvalidConfig)
    }
}
