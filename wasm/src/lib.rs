//! WebAssembly module for Flower Stock Management
//!
//! Provides client-side computation for:
//! - Batch expiry status (expired, days remaining, expiring soon)
//! - Withdrawal previews
//! - Container tallies and target progress
//! - Offline data validation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("flower-stock wasm ready"));
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

fn parse_moment(value: &str) -> Result<NaiveDateTime, JsValue> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|e| JsValue::from_str(&format!("Invalid local time: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Current local time from the browser clock, shifted to the given UTC offset
fn browser_now(offset_hours: i32) -> Result<NaiveDateTime, JsValue> {
    let clock = LocalClock::new(offset_hours).map_err(JsValue::from_str)?;
    let millis = js_sys::Date::now() as i64;
    let utc = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| JsValue::from_str("Browser clock out of range"))?;
    Ok(clock.at(utc))
}

/// Expiration date (YYYY-MM-DD) of a batch harvested on `harvest_date`
#[wasm_bindgen]
pub fn expiration_date_for(harvest_date: &str, validity_days: i32) -> Result<String, JsValue> {
    let harvest = parse_date("harvest date", harvest_date)?;
    let expires = expiration_date(harvest, validity_days)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(expires.format("%Y-%m-%d").to_string())
}

/// Whole days from `today` until `expiration`; negative once past
#[wasm_bindgen]
pub fn days_until_expiry(expiration: &str, today: &str) -> Result<i32, JsValue> {
    let exp = parse_date("expiration date", expiration)?;
    let today = parse_date("date", today)?;
    Ok(days_remaining(exp, today) as i32)
}

/// Status of a batch at a given local time, as JSON
#[wasm_bindgen]
pub fn batch_status_at(
    expiration: &str,
    local_time: &str,
    near_expiry_days: i32,
) -> Result<String, JsValue> {
    let exp = parse_date("expiration date", expiration)?;
    let now = parse_moment(local_time)?;
    to_json(&BatchStatus::evaluate(exp, now, i64::from(near_expiry_days)))
}

/// Status of a batch right now, as JSON
#[wasm_bindgen]
pub fn batch_status_now(
    expiration: &str,
    utc_offset_hours: i32,
    near_expiry_days: i32,
) -> Result<String, JsValue> {
    let exp = parse_date("expiration date", expiration)?;
    let now = browser_now(utc_offset_hours)?;
    to_json(&BatchStatus::evaluate(exp, now, i64::from(near_expiry_days)))
}

/// Preview a withdrawal without touching the server
#[wasm_bindgen]
pub fn preview_withdrawal(current: i32, requested: i32) -> Result<String, JsValue> {
    validate_withdrawal_quantity(requested).map_err(JsValue::from_str)?;
    let outcome =
        apply_withdrawal(current, requested).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&outcome)
}

/// Stems represented by a container tally
#[wasm_bindgen]
pub fn tally_stems(bunches: i32, buckets: i32, crates: i32) -> f64 {
    ContainerTally {
        bunches,
        buckets,
        crates,
    }
    .stems() as f64
}

/// Percentage of a target reached
#[wasm_bindgen]
pub fn target_percent(harvested_stems: f64, target_stems: i32) -> f64 {
    progress_percent(harvested_stems as i64, target_stems)
        .to_f64()
        .unwrap_or(0.0)
}

/// Check a new batch form offline. Returns the first problem, or an empty string
#[wasm_bindgen]
pub fn check_batch_form(variety: &str, quantity: i32, harvest_date: &str, today: &str) -> String {
    let result = validate_variety(variety)
        .and_then(|_| validate_batch_quantity(quantity))
        .and_then(|_| {
            let harvest = NaiveDate::parse_from_str(harvest_date, "%Y-%m-%d")
                .map_err(|_| "Harvest date must be YYYY-MM-DD")?;
            let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
                .map_err(|_| "Today must be YYYY-MM-DD")?;
            validate_harvest_date(harvest, today)
        });

    match result {
        Ok(()) => String::new(),
        Err(msg) => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_date_for() {
        assert_eq!(expiration_date_for("2024-05-01", 7).unwrap(), "2024-05-08");
        assert_eq!(expiration_date_for("2024-02-26", 5).unwrap(), "2024-03-02");
    }

    #[test]
    fn test_days_until_expiry() {
        assert_eq!(days_until_expiry("2024-05-08", "2024-05-06").unwrap(), 2);
        assert_eq!(days_until_expiry("2024-05-08", "2024-05-09").unwrap(), -1);
    }

    #[test]
    fn test_batch_status_at() {
        let json = batch_status_at("2024-05-08", "2024-05-07T10:00:00", 2).unwrap();
        let status: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(status["expired"], false);
        assert_eq!(status["near_expiry"], true);
        assert_eq!(status["days_remaining"], 1);

        let json = batch_status_at("2024-05-08", "2024-05-08T00:30", 2).unwrap();
        let status: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(status["expired"], true);
        assert_eq!(status["near_expiry"], false);
    }

    #[test]
    fn test_tally_and_percent() {
        assert_eq!(tally_stems(1, 1, 1), 85.0);
        assert!((target_percent(85.0, 170) - 50.0).abs() < 0.001);
        assert_eq!(target_percent(10.0, 0), 0.0);
    }

    #[test]
    fn test_check_batch_form() {
        assert_eq!(check_batch_form("Rosa", 10, "2024-05-01", "2024-05-02"), "");
        assert!(!check_batch_form("", 10, "2024-05-01", "2024-05-02").is_empty());
        assert!(!check_batch_form("Rosa", 0, "2024-05-01", "2024-05-02").is_empty());
        assert!(!check_batch_form("Rosa", 10, "2024-05-03", "2024-05-02").is_empty());
        assert!(!check_batch_form("Rosa", 10, "01/05/2024", "2024-05-02").is_empty());
    }
}
