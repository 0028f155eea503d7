//! Match generation, calendar placement and KPI evaluation.
//!
//! Formed groups are expanded into round-robin matches, which are then
//! placed onto courts and sub-slots of each group's common slot.
//!
//! # Algorithm
//!
//! `CalendarBuilder` assigns courts round-robin per slot in group order
//! and keeps each group on one court for its whole round. Groups beyond a
//! slot's capacity are resolved by the configured overflow policy and
//! never dropped silently.
//!
//! # KPI
//!
//! `GroupingKpi` computes average score, perfect-group rate and
//! assignment rate.

mod calendar;
mod kpi;
mod matches;

pub use calendar::CalendarBuilder;
pub use kpi::GroupingKpi;
pub use matches::MatchGenerator;
