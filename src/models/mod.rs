//! Grouping domain models.
//!
//! Provides the value types for a grouping run: the roster input, the
//! formed groups and their matches, the court calendar and the result.
//! Everything downstream of [`Pair`] references pairs by id.
//!
//! # Domain Mappings
//!
//! | u-grouping | Padel league | Chess club | Study groups |
//! |------------|--------------|------------|--------------|
//! | Pair | Two-player team | Player | Student |
//! | Category | Skill tier | Rating band | Course level |
//! | Slot | Weekly window | Evening | Lab session |
//! | Court | Court | Board | Room |

mod calendar;
mod group;
mod pair;
mod result;
mod slot;

pub use calendar::{
    Calendar, CalendarEntry, ConflictReason, SchedulingConflict, Violation, ViolationType,
};
pub use group::{Group, GroupScore, Match, GROUP_SIZE, MATCHES_PER_GROUP};
pub use pair::{Pair, PairRecord};
pub use result::{CategoryStats, ResultSet, ResultStats, RunStats, SearchMode};
pub use slot::{SlotCatalog, SlotSet, SlotToken, MAX_SLOTS};
