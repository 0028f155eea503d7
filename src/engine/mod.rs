//! Engine orchestration.
//!
//! A run validates the roster, buckets it by category, optimizes every
//! bucket in parallel, then numbers the groups, builds the calendar and
//! assembles the result.
//!
//! Runs are pure: the same configuration and roster always give the same
//! [`ResultSet`], byte for byte, as long as the search budget has no
//! wall-time limit.

mod assembler;

pub use assembler::{CategoryOutcome, ResultAssembler};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grouping::{partition_by_category, GroupOptimizer};
use crate::models::{Pair, PairRecord, ResultSet, SlotCatalog, SlotSet};
use crate::scheduler::{CalendarBuilder, MatchGenerator};
use crate::validation;

/// Group-formation and calendar-assignment engine.
///
/// # Example
///
/// ```
/// use u_grouping::config::EngineConfig;
/// use u_grouping::engine::GroupingEngine;
/// use u_grouping::models::PairRecord;
///
/// let config = EngineConfig::new()
///     .with_categories(["Cuarta"])
///     .with_slots(["Thu18", "Fri18"]);
/// let engine = GroupingEngine::new(config).unwrap();
///
/// let roster: Vec<PairRecord> = ["P1", "P2", "P3"]
///     .iter()
///     .map(|id| PairRecord {
///         id: id.to_string(),
///         name: format!("Team {id}"),
///         category: "Cuarta".into(),
///         available_slots: vec!["Thu18".into()],
///     })
///     .collect();
///
/// let result = engine.run_records(&roster).unwrap();
/// assert_eq!(result.stats.run.total_groups, 1);
/// assert_eq!(result.calendar.entry_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct GroupingEngine {
    config: EngineConfig,
    catalog: SlotCatalog,
}

impl GroupingEngine {
    /// Creates an engine. Fails on an invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let catalog = config.catalog();
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    /// Runs on label-based records.
    pub fn run_records(&self, records: &[PairRecord]) -> Result<ResultSet, EngineError> {
        let pairs =
            validation::intern_records(&self.catalog, records).map_err(EngineError::InvalidInput)?;
        self.run(&pairs)
    }

    /// Runs on a JSON array of records.
    pub fn run_json(&self, json: &str) -> Result<ResultSet, EngineError> {
        let records: Vec<PairRecord> = serde_json::from_str(json)?;
        self.run_records(&records)
    }

    /// Runs on interned pairs.
    ///
    /// Any invalid pair aborts the run; no partial result is produced.
    pub fn run(&self, pairs: &[Pair]) -> Result<ResultSet, EngineError> {
        validation::validate_input(&self.config, pairs).map_err(EngineError::InvalidInput)?;

        info!(
            pairs = pairs.len(),
            categories = self.config.categories.len(),
            courts = self.config.court_count,
            "grouping run started"
        );

        let optimizer = GroupOptimizer::new(&self.config);
        let buckets = partition_by_category(&self.config.categories, pairs);

        let outcomes: Vec<CategoryOutcome<'_>> = buckets
            .into_par_iter()
            .map(|bucket| {
                let slots: Vec<SlotSet> = bucket.pairs.iter().map(|p| p.available_slots).collect();
                let optimized = optimizer.optimize(&slots);
                CategoryOutcome {
                    category: bucket.category,
                    pairs: bucket.pairs,
                    optimized,
                }
            })
            .collect();

        let mut assembler = ResultAssembler::new();
        for outcome in &outcomes {
            let groups = assembler.add_category(outcome);
            debug!(
                category = outcome.category,
                pairs = outcome.pairs.len(),
                mode = ?outcome.optimized.mode,
                groups = groups.len(),
                leftovers = outcome.optimized.partition.leftovers.len(),
                nodes = outcome.optimized.nodes_explored,
                "category optimized"
            );
            if outcome.optimized.truncated {
                warn!(
                    category = outcome.category,
                    nodes = outcome.optimized.nodes_explored,
                    "exact search budget exhausted, keeping best partition found"
                );
            }
        }

        let matches = MatchGenerator::for_groups(assembler.groups());
        let calendar = CalendarBuilder::new(&self.config).build(&matches);
        if !calendar.is_complete() {
            warn!(
                conflicts = calendar.conflicts.len(),
                unplaced = calendar.unplaced_count(),
                "some matches could not be scheduled"
            );
        }

        let result = assembler.finish(calendar);
        info!(
            groups = result.stats.run.total_groups,
            unassigned = result.stats.run.unassigned_pairs,
            scheduled = result.stats.run.matches_scheduled,
            "grouping run finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OverflowPolicy, SearchBudget};
    use crate::models::{ConflictReason, GroupScore, SearchMode, SlotToken};
    use crate::validation::ValidationErrorKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn config() -> EngineConfig {
        EngineConfig::new()
            .with_categories(["Cuarta"])
            .with_slots(["Thu18", "Fri18", "Sat09"])
    }

    fn pair(id: &str, slots: &[usize]) -> Pair {
        Pair::new(id, format!("Team {id}"), "Cuarta")
            .with_slots(SlotSet::from_indices(slots.iter().copied()))
    }

    fn scenario_a() -> Vec<Pair> {
        (0..9)
            .map(|i| pair(&format!("P{}", i + 1), &[i / 3]))
            .collect()
    }

    #[test]
    fn test_scenario_a_three_perfect_groups() {
        let engine = GroupingEngine::new(config()).unwrap();
        let result = engine.run(&scenario_a()).unwrap();

        let groups = &result.groups_by_category["Cuarta"];
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.score == GroupScore::Perfect));
        assert!(result.unassigned_pairs.is_empty());
        assert_eq!(result.calendar.entry_count(), 9);
        assert!(result.calendar.is_complete());
        assert!(result.calendar.find_violations().is_empty());

        let stats = result.category_stats("Cuarta").unwrap();
        assert_eq!(stats.mode, SearchMode::Exact);
        assert!((stats.perfect_group_pct - 100.0).abs() < 1e-10);
        assert!((stats.average_score - 3.0).abs() < 1e-10);

        let g = result.group_of("P5").unwrap();
        assert_eq!(g.common_slot, Some(SlotToken::new(1)));
    }

    #[test]
    fn test_scenario_b_isolated_pair_left_over() {
        let engine = GroupingEngine::new(config()).unwrap();
        let pairs = vec![
            pair("P1", &[0]),
            pair("P2", &[0, 1]),
            pair("P3", &[2]),
            pair("P4", &[0, 1]),
        ];
        let result = engine.run(&pairs).unwrap();

        let groups = &result.groups_by_category["Cuarta"];
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, ["P1", "P2", "P4"].map(String::from));
        assert_eq!(groups[0].score, GroupScore::Perfect);
        assert_eq!(result.unassigned_pairs, vec!["P3"]);
        assert_eq!(result.category_stats("Cuarta").unwrap().mode, SearchMode::Greedy);
    }

    fn scenario_c() -> Vec<Pair> {
        (1..=6).map(|i| pair(&format!("P{i}"), &[0])).collect()
    }

    #[test]
    fn test_scenario_c_next_block() {
        let engine = GroupingEngine::new(
            config()
                .with_court_count(1)
                .with_sub_slots(6)
                .with_overflow_policy(OverflowPolicy::NextSubSlotBlock),
        )
        .unwrap();
        let result = engine.run(&scenario_c()).unwrap();

        assert!(result.calendar.is_complete());
        assert_eq!(result.calendar.entry_count(), 6);
        let subs: Vec<usize> = result.calendar.entries_for_group(2).iter().map(|e| e.sub_slot).collect();
        assert_eq!(subs, vec![3, 4, 5]);
        assert!(result.calendar.find_violations().is_empty());
    }

    #[test]
    fn test_scenario_c_reject() {
        let engine = GroupingEngine::new(
            config()
                .with_court_count(1)
                .with_sub_slots(6)
                .with_overflow_policy(OverflowPolicy::Reject),
        )
        .unwrap();
        let result = engine.run(&scenario_c()).unwrap();

        assert_eq!(result.calendar.entry_count(), 3);
        assert_eq!(result.calendar.conflicts.len(), 1);
        assert_eq!(result.calendar.conflicts[0].group_id, 2);
        assert!(matches!(
            result.calendar.conflicts[0].reason,
            ConflictReason::CapacityExceeded { groups_in_slot: 2, capacity: 1, .. }
        ));
        assert_eq!(result.stats.run.matches_unplaced, 3);
    }

    #[test]
    fn test_invalid_input_aborts() {
        let engine = GroupingEngine::new(config()).unwrap();
        let mut pairs = scenario_a();
        pairs.push(pair("P10", &[]));
        pairs.push(Pair::new("P11", "Team", "Primera").with_slots(SlotSet::from_indices([0])));

        let err = engine.run(&pairs).unwrap_err();
        let kinds: Vec<&ValidationErrorKind> = err.validation_errors().iter().map(|e| &e.kind).collect();
        assert!(kinds.contains(&&ValidationErrorKind::EmptyAvailability));
        assert!(kinds.contains(&&ValidationErrorKind::UnknownCategory));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = GroupingEngine::new(config().with_court_count(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_run_json() {
        let engine = GroupingEngine::new(config()).unwrap();
        let json = r#"[
            {"id": "A", "name": "Ana/Bea", "category": "Cuarta", "availableSlots": ["Thu18", "Fri18"]},
            {"id": "B", "name": "Cris/Dani", "category": "Cuarta", "availableSlots": ["Fri18"]},
            {"id": "C", "name": "Eva/Flor", "category": "Cuarta", "availableSlots": ["Fri18", "Sat09"]}
        ]"#;
        let result = engine.run_json(json).unwrap();
        let group = &result.groups_by_category["Cuarta"][0];
        assert_eq!(group.common_slot, engine.catalog().token("Fri18"));

        let err = engine
            .run_json(r#"[{"id": "A", "name": "A", "category": "Cuarta", "availableSlots": ["Sun"]}]"#)
            .unwrap_err();
        assert_eq!(err.validation_errors()[0].kind, ValidationErrorKind::UnknownSlot);
    }

    #[test]
    fn test_output_shape() {
        let engine = GroupingEngine::new(config().with_categories(["Cuarta", "Quinta"])).unwrap();
        let result = engine.run(&scenario_a()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert!(value["groupsByCategory"]["Quinta"].as_array().unwrap().is_empty());
        assert_eq!(value["groupsByCategory"]["Cuarta"][0]["score"], 3.0);
        assert_eq!(value["calendar"]["entries"][0]["matchId"], "1-0");
        assert_eq!(value["stats"]["categories"][0]["mode"], "exact");
        assert_eq!(value["stats"]["run"]["totalPairs"], 9);
    }

    fn random_roster(seed: u64, n: usize, categories: &[&str], slot_count: usize) -> Vec<Pair> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let category = categories[rng.random_range(0..categories.len())];
                let mut slots = SlotSet::from_indices([rng.random_range(0..slot_count)]);
                for s in 0..slot_count {
                    if rng.random_bool(0.25) {
                        slots.insert(SlotToken::new(s));
                    }
                }
                Pair::new(format!("P{i}"), format!("Team {i}"), category).with_slots(slots)
            })
            .collect()
    }

    #[test]
    fn test_deterministic_output() {
        let categories = ["Cuarta", "Quinta", "Sexta", "Séptima"];
        let engine = GroupingEngine::new(EngineConfig::default()).unwrap();
        let pairs = random_roster(42, 80, &categories, 8);

        let first = engine.run(&pairs).unwrap().to_json().unwrap();
        let second = engine.run(&pairs).unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_accounting_and_disjoint_groups() {
        let categories = ["Cuarta", "Quinta", "Sexta", "Séptima"];
        let engine = GroupingEngine::new(
            EngineConfig::default().with_search_budget(SearchBudget::nodes(20_000)),
        )
        .unwrap();

        for seed in 0..5 {
            let pairs = random_roster(seed, 60, &categories, 8);
            let result = engine.run(&pairs).unwrap();

            for stats in &result.stats.categories {
                assert_eq!(stats.groups_formed * 3 + stats.unassigned_count, stats.pair_count);
                let expected = pairs.iter().filter(|p| p.category == stats.category).count();
                assert_eq!(stats.pair_count, expected);
            }

            let mut seen = HashSet::new();
            for g in result.groups() {
                for m in &g.members {
                    assert!(seen.insert(m.clone()), "{m} grouped twice");
                    let category = &pairs.iter().find(|p| &p.id == m).unwrap().category;
                    assert_eq!(category, &g.category);
                }
            }
            for id in &result.unassigned_pairs {
                assert!(seen.insert(id.clone()), "{id} both grouped and unassigned");
            }
            assert_eq!(seen.len(), pairs.len());

            let ids: Vec<u32> = result.groups().map(|g| g.id).collect();
            assert_eq!(ids, (1..=ids.len() as u32).collect::<Vec<_>>());

            assert!(result.calendar.find_violations().is_empty());
            assert_eq!(
                result.calendar.entry_count() + result.calendar.unplaced_count(),
                result.stats.run.total_groups * 3
            );
        }
    }

    #[test]
    fn test_empty_roster() {
        let engine = GroupingEngine::new(EngineConfig::default()).unwrap();
        let result = engine.run(&[]).unwrap();
        assert_eq!(result.groups_by_category.len(), 4);
        assert_eq!(result.stats.run.total_pairs, 0);
        assert!(result.calendar.entries.is_empty());
    }
}
