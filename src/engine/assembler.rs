//! Result assembly.
//!
//! Turns per-category optimizer output into identified groups, leftover
//! lists and statistics, then merges them with the calendar into one
//! [`ResultSet`].

use std::collections::BTreeMap;

use crate::grouping::Optimized;
use crate::models::{Calendar, CategoryStats, Group, Pair, ResultSet, ResultStats};
use crate::scheduler::GroupingKpi;

/// Optimizer output for one category bucket.
#[derive(Debug, Clone)]
pub struct CategoryOutcome<'a> {
    pub category: &'a str,
    /// Bucket pairs; optimizer indices point into this list.
    pub pairs: Vec<&'a Pair>,
    pub optimized: Optimized,
}

/// Collects category outcomes into a [`ResultSet`].
///
/// Categories must be added in configured order: group ids are handed
/// out sequentially from 1 as categories arrive.
#[derive(Debug, Default)]
pub struct ResultAssembler {
    next_group_id: u32,
    order: Vec<String>,
    groups_by_category: BTreeMap<String, Vec<Group>>,
    unassigned: Vec<String>,
    categories: Vec<CategoryStats>,
}

impl ResultAssembler {
    pub fn new() -> Self {
        Self {
            next_group_id: 1,
            ..Self::default()
        }
    }

    /// Adds one category and returns its groups.
    pub fn add_category(&mut self, outcome: &CategoryOutcome<'_>) -> &[Group] {
        let mut groups = Vec::with_capacity(outcome.optimized.partition.groups.len());

        for draft in &outcome.optimized.partition.groups {
            let members = draft.members.map(|i| outcome.pairs[i].id.clone());
            let uncovered = draft.compatibility.uncovered.map(|i| members[i].clone());
            groups.push(Group {
                id: self.next_group_id,
                category: outcome.category.to_string(),
                members,
                common_slot: draft.compatibility.common_slot,
                score: draft.compatibility.score,
                uncovered,
            });
            self.next_group_id += 1;
        }

        self.unassigned.extend(
            outcome
                .optimized
                .partition
                .leftovers
                .iter()
                .map(|&i| outcome.pairs[i].id.clone()),
        );

        let stats = GroupingKpi::calculate(&groups).category_stats(
            outcome.category,
            outcome.pairs.len(),
            outcome.optimized.mode,
            outcome.optimized.truncated,
            outcome.optimized.nodes_explored,
        );
        self.categories.push(stats);
        self.order.push(outcome.category.to_string());

        let slot = self
            .groups_by_category
            .entry(outcome.category.to_string())
            .or_default();
        slot.extend(groups);
        slot
    }

    /// Groups added so far, in production order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.order
            .iter()
            .filter_map(|c| self.groups_by_category.get(c))
            .flatten()
    }

    /// Merges everything with the calendar.
    pub fn finish(self, calendar: Calendar) -> ResultSet {
        let run = GroupingKpi::calculate(self.groups()).run_stats(&self.categories, &calendar);

        ResultSet {
            groups_by_category: self.groups_by_category,
            unassigned_pairs: self.unassigned,
            calendar,
            stats: ResultStats {
                categories: self.categories,
                run,
            },
        }
    }
}
