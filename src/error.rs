//! Engine error type.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that abort an engine call.
///
/// Scheduling conflicts are not errors at this level; they are reported
/// inside the calendar of a successful run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {}", join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("pair '{pair_id}' is not a member of group {group_id}")]
    UnknownPair { group_id: u32, pair_id: String },

    #[error("category '{category}' has no groups")]
    NoGroups { category: String },

    #[error("category '{category}' has {groups} groups, at most 16 fit a bracket")]
    TooManyGroups { category: String, groups: usize },

    #[error("group {group_id} has not finished its round-robin")]
    IncompleteGroup { group_id: u32 },

    #[error("unknown finals match '{match_id}'")]
    UnknownMatch { match_id: String },

    #[error("finals match '{match_id}' does not have both entrants yet")]
    MatchNotReady { match_id: String },

    #[error("pair '{pair_id}' does not play finals match '{match_id}'")]
    NotInMatch { match_id: String, pair_id: String },

    #[error("result for finals match '{match_id}' has no winner")]
    UndecidedResult { match_id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Validation errors carried by this error, if any.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            EngineError::InvalidConfig(errors) | EngineError::InvalidInput(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
