//! Input validation for grouping runs.
//!
//! Checks configuration and roster integrity before any optimization.
//! Every check runs and all problems are collected, but the engine treats
//! any error as fatal: a run on invalid input produces no result at all.
//!
//! Detects:
//! - Duplicate IDs, categories or slot labels
//! - Empty names and empty availability
//! - Unknown categories and slots
//! - Out-of-range court and sub-slot settings

use std::collections::HashSet;
use std::fmt;

use crate::config::{EngineConfig, SUB_SLOTS_PER_ROUND};
use crate::models::{Pair, PairRecord, SlotCatalog, MAX_SLOTS};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID or label.
    DuplicateId,
    /// A pair has an empty name.
    EmptyName,
    /// A pair has no available slot.
    EmptyAvailability,
    /// A pair's category is not configured.
    UnknownCategory,
    /// A slot label or token is not in the catalog.
    UnknownSlot,
    /// A numeric setting is out of range.
    InvalidSetting,
    /// A required list is empty.
    EmptyList,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates an engine configuration.
///
/// Checks:
/// 1. At least one category, no duplicates
/// 2. At least one slot, no duplicates, at most [`MAX_SLOTS`]
/// 3. At least one court
/// 4. At least 3 sub-slots per slot
/// 5. A consistent exact-search group range
pub fn validate_config(config: &EngineConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.categories.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyList,
            "No categories configured",
        ));
    }
    check_unique(&config.categories, "category", &mut errors);

    if config.slots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyList,
            "No slots configured",
        ));
    }
    if config.slots.len() > MAX_SLOTS {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSetting,
            format!(
                "{} slots configured, at most {MAX_SLOTS} supported",
                config.slots.len()
            ),
        ));
    }
    check_unique(&config.slots, "slot", &mut errors);

    if config.court_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSetting,
            "Court count must be positive",
        ));
    }

    if config.sub_slots_per_slot < SUB_SLOTS_PER_ROUND {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSetting,
            format!(
                "Sub-slots per slot must be at least {SUB_SLOTS_PER_ROUND}, got {}",
                config.sub_slots_per_slot
            ),
        ));
    }

    if config.exact_search_min_groups > config.exact_search_max_groups {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSetting,
            format!(
                "Exact search range {}..={} is empty",
                config.exact_search_min_groups, config.exact_search_max_groups
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unique(labels: &[String], what: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label.trim()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what}: {label}"),
            ));
        }
    }
}

/// Validates a roster against a configuration.
///
/// Checks:
/// 1. No duplicate pair IDs
/// 2. Every pair has a non-empty name
/// 3. Every pair's category is configured
/// 4. Every pair has at least one available slot
/// 5. Every available slot exists in the catalog
pub fn validate_input(config: &EngineConfig, pairs: &[Pair]) -> ValidationResult {
    let catalog = config.catalog();
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for pair in pairs {
        if !ids.insert(pair.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate pair ID: {}", pair.id),
            ));
        }

        if pair.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                format!("Pair '{}' has an empty name", pair.id),
            ));
        }

        if !config.has_category(&pair.category) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCategory,
                format!(
                    "Pair '{}' has unknown category '{}'",
                    pair.id, pair.category
                ),
            ));
        }

        if pair.available_slots.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyAvailability,
                format!("Pair '{}' has no available slots", pair.id),
            ));
        } else if let Some(last) = pair.available_slots.last() {
            if !catalog.contains(last) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSlot,
                    format!(
                        "Pair '{}' references slot index {} outside the catalog",
                        pair.id,
                        last.index()
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Interns label-based records into pairs.
///
/// Collects every unknown slot label before failing.
pub fn intern_records(
    catalog: &SlotCatalog,
    records: &[PairRecord],
) -> Result<Vec<Pair>, Vec<ValidationError>> {
    let mut pairs = Vec::with_capacity(records.len());
    let mut errors = Vec::new();

    for record in records {
        match Pair::from_record(record, catalog) {
            Ok(pair) => pairs.push(pair),
            Err(label) => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSlot,
                format!("Pair '{}' references unknown slot '{label}'", record.id),
            )),
        }
    }

    if errors.is_empty() {
        Ok(pairs)
    } else {
        Err(errors)
    }
}
