//! Run result model.
//!
//! A [`ResultSet`] is produced fresh by every engine run and wholly
//! replaces any previous one. All collections are ordered so that
//! identical inputs serialize to identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Calendar, Group};

/// How a category bucket was partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Branch-and-bound over all partitions.
    Exact,
    /// Repeated best-triple selection.
    Greedy,
    /// Fewer than three pairs; nothing to partition.
    None,
}

/// Per-category statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub pair_count: usize,
    pub groups_formed: usize,
    pub unassigned_count: usize,
    /// Mean group score; 0.0 when no group was formed.
    pub average_score: f64,
    /// Share of groups scoring 3.0, in percent.
    pub perfect_group_pct: f64,
    pub perfect_groups: usize,
    pub partial_groups: usize,
    pub mode: SearchMode,
    /// Exact search hit its budget; the partition is the best found.
    pub truncated: bool,
    pub nodes_explored: u64,
}

/// Run-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_pairs: usize,
    pub assigned_pairs: usize,
    pub unassigned_pairs: usize,
    /// Assigned share of all pairs, in percent.
    pub assignment_pct: f64,
    pub total_groups: usize,
    pub average_score: f64,
    pub perfect_groups: usize,
    pub partial_groups: usize,
    pub matches_scheduled: usize,
    pub matches_unplaced: usize,
}

/// Statistics section of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStats {
    /// One entry per configured category, in configured order.
    pub categories: Vec<CategoryStats>,
    pub run: RunStats,
}

/// Complete output of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// Groups per category; every configured category is present.
    pub groups_by_category: BTreeMap<String, Vec<Group>>,
    /// Leftover pair ids, by category order then roster order.
    pub unassigned_pairs: Vec<String>,
    pub calendar: Calendar,
    pub stats: ResultStats,
}

impl ResultSet {
    /// All groups in production order (configured category order, then
    /// group order within the category).
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.stats
            .categories
            .iter()
            .filter_map(|c| self.groups_by_category.get(&c.category))
            .flatten()
    }

    /// Group containing a pair, if any.
    pub fn group_of(&self, pair_id: &str) -> Option<&Group> {
        self.groups().find(|g| g.contains(pair_id))
    }

    /// Stats for one category.
    pub fn category_stats(&self, category: &str) -> Option<&CategoryStats> {
        self.stats.categories.iter().find(|c| c.category == category)
    }

    /// Whether any category search was truncated by its budget.
    pub fn is_truncated(&self) -> bool {
        self.stats.categories.iter().any(|c| c.truncated)
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupScore, SlotToken};

    fn stats(category: &str, truncated: bool) -> CategoryStats {
        CategoryStats {
            category: category.into(),
            pair_count: 3,
            groups_formed: 1,
            unassigned_count: 0,
            average_score: 3.0,
            perfect_group_pct: 100.0,
            perfect_groups: 1,
            partial_groups: 0,
            mode: SearchMode::Greedy,
            truncated,
            nodes_explored: 0,
        }
    }

    fn sample_result() -> ResultSet {
        let group = |id: u32, cat: &str, base: u32| Group {
            id,
            category: cat.into(),
            members: [
                format!("P{base}"),
                format!("P{}", base + 1),
                format!("P{}", base + 2),
            ],
            common_slot: Some(SlotToken::new(0)),
            score: GroupScore::Perfect,
            uncovered: None,
        };
        let mut groups_by_category = BTreeMap::new();
        groups_by_category.insert("Sexta".to_string(), vec![group(1, "Sexta", 1)]);
        groups_by_category.insert("Cuarta".to_string(), vec![group(2, "Cuarta", 4)]);

        ResultSet {
            groups_by_category,
            unassigned_pairs: vec![],
            calendar: Calendar::new(),
            stats: ResultStats {
                categories: vec![stats("Sexta", false), stats("Cuarta", true)],
                run: RunStats {
                    total_pairs: 6,
                    assigned_pairs: 6,
                    unassigned_pairs: 0,
                    assignment_pct: 100.0,
                    total_groups: 2,
                    average_score: 3.0,
                    perfect_groups: 2,
                    partial_groups: 0,
                    matches_scheduled: 0,
                    matches_unplaced: 0,
                },
            },
        }
    }

    #[test]
    fn test_groups_follow_category_order() {
        let r = sample_result();
        let ids: Vec<u32> = r.groups().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2]); // Sexta configured before Cuarta
    }

    #[test]
    fn test_group_of() {
        let r = sample_result();
        assert_eq!(r.group_of("P5").map(|g| g.id), Some(2));
        assert!(r.group_of("P9").is_none());
    }

    #[test]
    fn test_truncation_flag() {
        let r = sample_result();
        assert!(r.is_truncated());
        assert!(!r.category_stats("Sexta").unwrap().truncated);
    }

    #[test]
    fn test_json_keys() {
        let json: serde_json::Value = serde_json::from_str(&sample_result().to_json().unwrap()).unwrap();
        assert!(json.get("groupsByCategory").is_some());
        assert!(json.get("unassignedPairs").is_some());
        assert!(json["calendar"].get("entries").is_some());
        assert_eq!(json["stats"]["categories"][1]["mode"], "greedy");
        assert_eq!(json["stats"]["run"]["totalGroups"], 2);
    }
}
