//! Validation utilities for Flower Stock Management

use chrono::NaiveDate;

use crate::models::ContainerTally;

/// Longest variety name accepted
pub const MAX_VARIETY_LEN: usize = 100;

/// Longest validity period accepted, in days
pub const MAX_VALIDITY_DAYS: i32 = 60;

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a variety name (non-blank, bounded length)
pub fn validate_variety(variety: &str) -> Result<(), &'static str> {
    let trimmed = variety.trim();
    if trimmed.is_empty() {
        return Err("Variety is required");
    }
    if trimmed.chars().count() > MAX_VARIETY_LEN {
        return Err("Variety must be at most 100 characters");
    }
    Ok(())
}

/// Normalize a variety name for storage
pub fn normalize_variety(variety: &str) -> String {
    variety.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key two spellings of a variety share when matched or grouped
pub fn variety_key(variety: &str) -> String {
    normalize_variety(variety).to_lowercase()
}

/// Whether two names denote the same variety (case and spacing ignored)
pub fn same_variety(a: &str, b: &str) -> bool {
    variety_key(a) == variety_key(b)
}

/// Validate the quantity of a new batch
pub fn validate_batch_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// Validate a withdrawal request
pub fn validate_withdrawal_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Withdrawal quantity must be at least 1");
    }
    Ok(())
}

/// Harvest dates cannot be in the (local) future
pub fn validate_harvest_date(harvest_date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if harvest_date > today {
        return Err("Harvest date cannot be in the future");
    }
    Ok(())
}

/// Validate a configured validity period
pub fn validate_validity_days(days: i32) -> Result<(), &'static str> {
    if !(1..=MAX_VALIDITY_DAYS).contains(&days) {
        return Err("Validity period must be between 1 and 60 days");
    }
    Ok(())
}

// ============================================================================
// Target Validations
// ============================================================================

/// Validate a harvest target
pub fn validate_target_stems(target_stems: i32) -> Result<(), &'static str> {
    if target_stems < 0 {
        return Err("Target cannot be negative");
    }
    Ok(())
}

/// Validate container counts of a harvest record
pub fn validate_tally(tally: &ContainerTally) -> Result<(), &'static str> {
    if tally.has_negative() {
        return Err("Container counts cannot be negative");
    }
    if tally.is_empty() {
        return Err("At least one container must be counted");
    }
    Ok(())
}
