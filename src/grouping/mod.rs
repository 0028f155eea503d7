//! Group formation.
//!
//! Pairs are bucketed by category, then each bucket is partitioned into
//! triples that share as much availability as possible.
//!
//! # Modules
//!
//! - **`partition`**: Category bucketing
//! - **`scoring`**: Triple compatibility score and common slot
//! - **`optimizer`**: Exact branch-and-bound and greedy partitioning

mod optimizer;
mod partition;
mod scoring;

pub use optimizer::{DraftGroup, GroupOptimizer, Optimized, Partition};
pub use partition::{partition_by_category, CategoryBucket};
pub use scoring::{score_pairs, score_triple, Compatibility};
