//! Group formation and court calendar assignment for round-robin leagues.
//!
//! Pairs (two-player teams) declare a skill category and the weekly slots
//! they can play in. The engine partitions each category into groups of
//! three pairs that share as much availability as possible, then places
//! every group's round-robin on a court of its common slot without
//! double-booking any pair or court.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Pair`, `Group`, `Match`, `Calendar`,
//!   `ResultSet`, interned `SlotToken`/`SlotSet`
//! - **`config`**: `EngineConfig`, search budget and overflow policy
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown categories and slots)
//! - **`grouping`**: Category buckets, triple scoring, exact and greedy partitioning
//! - **`scheduler`**: Match generation, court/sub-slot placement, KPIs
//! - **`engine`**: `GroupingEngine` orchestration and result assembly
//! - **`standings`**: Group tables from reported match results
//! - **`finals`**: Knockout bracket seeded from completed group tables
//!
//! # Example
//!
//! ```
//! use u_grouping::config::EngineConfig;
//! use u_grouping::engine::GroupingEngine;
//! use u_grouping::models::{GroupScore, Pair, SlotSet};
//!
//! let config = EngineConfig::new()
//!     .with_categories(["Quinta"])
//!     .with_slots(["Thu18", "Fri18", "Sat09"]);
//! let engine = GroupingEngine::new(config).unwrap();
//!
//! let pairs: Vec<Pair> = (1..=4)
//!     .map(|i| {
//!         let slots = if i == 4 { [2] } else { [0] };
//!         Pair::new(format!("P{i}"), format!("Team {i}"), "Quinta")
//!             .with_slots(SlotSet::from_indices(slots))
//!     })
//!     .collect();
//!
//! let result = engine.run(&pairs).unwrap();
//! let groups = &result.groups_by_category["Quinta"];
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].score, GroupScore::Perfect);
//! assert_eq!(result.unassigned_pairs, vec!["P4"]);
//! ```
//!
//! # References
//!
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

pub mod config;
pub mod engine;
pub mod error;
pub mod finals;
pub mod grouping;
pub mod models;
pub mod scheduler;
pub mod standings;
pub mod validation;

pub use config::EngineConfig;
pub use engine::GroupingEngine;
pub use error::EngineError;
pub use models::ResultSet;
