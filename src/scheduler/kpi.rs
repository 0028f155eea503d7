//! Grouping quality metrics (KPIs).
//!
//! Computes summary indicators from formed groups and the calendar.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Average score | Mean group score (0.0 without groups) |
//! | Perfect rate | Share of groups scoring 3.0, in percent |
//! | Assignment rate | Share of pairs placed in a group, in percent |
//! | Matches scheduled | Calendar entries placed |
//! | Matches unplaced | Matches held in scheduling conflicts |

use crate::models::{
    Calendar, CategoryStats, Group, GroupScore, RunStats, SearchMode, GROUP_SIZE,
};

/// Score indicators over a set of groups.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingKpi {
    /// Number of groups.
    pub groups: usize,
    /// Groups scoring 3.0.
    pub perfect_groups: usize,
    /// Groups scoring 2.0.
    pub partial_groups: usize,
    /// Groups scoring 0.0.
    pub incompatible_groups: usize,
    /// Mean score (0.0..=3.0).
    pub average_score: f64,
    /// Perfect share in percent (0.0..=100.0).
    pub perfect_group_pct: f64,
}

impl GroupingKpi {
    /// Computes KPIs from groups.
    pub fn calculate<'a>(groups: impl IntoIterator<Item = &'a Group>) -> Self {
        let mut count = 0usize;
        let mut perfect = 0usize;
        let mut partial = 0usize;
        let mut total = 0.0;

        for group in groups {
            count += 1;
            total += group.score.value();
            match group.score {
                GroupScore::Perfect => perfect += 1,
                GroupScore::Partial => partial += 1,
                GroupScore::Incompatible => {}
            }
        }

        Self {
            groups: count,
            perfect_groups: perfect,
            partial_groups: partial,
            incompatible_groups: count - perfect - partial,
            average_score: if count > 0 { total / count as f64 } else { 0.0 },
            perfect_group_pct: percent(perfect, count),
        }
    }

    /// Checks minimum quality levels.
    pub fn meets_thresholds(&self, min_average: f64, min_perfect_pct: f64) -> bool {
        self.average_score >= min_average && self.perfect_group_pct >= min_perfect_pct
    }

    /// Per-category stats entry.
    pub fn category_stats(
        &self,
        category: &str,
        pair_count: usize,
        mode: SearchMode,
        truncated: bool,
        nodes_explored: u64,
    ) -> CategoryStats {
        CategoryStats {
            category: category.to_string(),
            pair_count,
            groups_formed: self.groups,
            unassigned_count: pair_count.saturating_sub(self.groups * GROUP_SIZE),
            average_score: self.average_score,
            perfect_group_pct: self.perfect_group_pct,
            perfect_groups: self.perfect_groups,
            partial_groups: self.partial_groups,
            mode,
            truncated,
            nodes_explored,
        }
    }

    /// Run-wide stats from the per-category entries, the KPIs over every
    /// group of the run, and the calendar.
    pub fn run_stats(&self, categories: &[CategoryStats], calendar: &Calendar) -> RunStats {
        let total_pairs: usize = categories.iter().map(|c| c.pair_count).sum();
        let unassigned_pairs: usize = categories.iter().map(|c| c.unassigned_count).sum();
        let assigned_pairs = total_pairs - unassigned_pairs;

        RunStats {
            total_pairs,
            assigned_pairs,
            unassigned_pairs,
            assignment_pct: percent(assigned_pairs, total_pairs),
            total_groups: self.groups,
            average_score: self.average_score,
            perfect_groups: self.perfect_groups,
            partial_groups: self.partial_groups,
            matches_scheduled: calendar.entry_count(),
            matches_unplaced: calendar.unplaced_count(),
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}
