//! Flower batch ("lote") models and the expiry lifecycle

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Days a batch stays sellable after harvest
pub const DEFAULT_VALIDITY_DAYS: i32 = 7;

/// Batches with this many days left (or fewer) are flagged for alerting
pub const DEFAULT_NEAR_EXPIRY_DAYS: i64 = 2;

/// A batch of one flower variety harvested on one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Batch {
    pub id: Uuid,
    pub variety: String,
    pub harvest_date: NaiveDate,
    pub quantity: i32,
    /// Validity period in force when the batch was created
    pub validity_days: i32,
    /// Fixed at creation; never recomputed when the policy changes
    pub expiration_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    /// Derived status as seen from local time `now`
    pub fn status(&self, now: NaiveDateTime, near_expiry_days: i64) -> BatchStatus {
        BatchStatus::evaluate(self.expiration_date, now, near_expiry_days)
    }
}

/// Lifecycle errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Withdrawal quantity must be positive, got {0}")]
    NonPositiveWithdrawal(i32),

    #[error("Batch quantity cannot be negative, got {0}")]
    NegativeQuantity(i32),

    #[error("Validity period must be at least one day, got {0}")]
    InvalidValidity(i32),
}

/// Last sellable date for a batch harvested on `harvest_date`
pub fn expiration_date(
    harvest_date: NaiveDate,
    validity_days: i32,
) -> Result<NaiveDate, LifecycleError> {
    if validity_days < 1 {
        return Err(LifecycleError::InvalidValidity(validity_days));
    }
    Ok(harvest_date + Duration::days(i64::from(validity_days)))
}

/// A batch is expired once `now` passes the start of its expiration date.
pub fn is_expired(expiration_date: NaiveDate, now: NaiveDateTime) -> bool {
    now > expiration_date.and_time(NaiveTime::MIN)
}

/// Whole days from `today` to the expiration date; negative once past.
pub fn days_remaining(expiration_date: NaiveDate, today: NaiveDate) -> i64 {
    (expiration_date - today).num_days()
}

pub fn is_near_expiry(expiration_date: NaiveDate, now: NaiveDateTime, threshold_days: i64) -> bool {
    !is_expired(expiration_date, now) && days_remaining(expiration_date, now.date()) <= threshold_days
}

/// Derived state of a batch at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchStatus {
    pub expiration_date: NaiveDate,
    pub expired: bool,
    pub days_remaining: i64,
    pub near_expiry: bool,
}

impl BatchStatus {
    pub fn evaluate(expiration_date: NaiveDate, now: NaiveDateTime, near_expiry_days: i64) -> Self {
        Self {
            expiration_date,
            expired: is_expired(expiration_date, now),
            days_remaining: days_remaining(expiration_date, now.date()),
            near_expiry: is_near_expiry(expiration_date, now, near_expiry_days),
        }
    }

    pub fn label(&self) -> &'static str {
        status_label(self.expired, self.near_expiry)
    }
}

fn status_label(expired: bool, near_expiry: bool) -> &'static str {
    if expired {
        "expired"
    } else if near_expiry {
        "expiring"
    } else {
        "valid"
    }
}

/// A batch together with its derived status, as listed and reported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchView {
    pub id: Uuid,
    pub variety: String,
    pub quantity: i32,
    pub harvest_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub expired: bool,
    pub days_remaining: i64,
    pub near_expiry: bool,
}

impl BatchView {
    pub fn new(batch: &Batch, now: NaiveDateTime, near_expiry_days: i64) -> Self {
        let status = batch.status(now, near_expiry_days);
        Self {
            id: batch.id,
            variety: batch.variety.clone(),
            quantity: batch.quantity,
            harvest_date: batch.harvest_date,
            expiration_date: status.expiration_date,
            expired: status.expired,
            days_remaining: status.days_remaining,
            near_expiry: status.near_expiry,
        }
    }

    pub fn label(&self) -> &'static str {
        status_label(self.expired, self.near_expiry)
    }
}

/// Evaluate and order batches by variety, then harvest date
pub fn evaluate_batches(batches: &[Batch], now: NaiveDateTime, near_expiry_days: i64) -> Vec<BatchView> {
    let mut views: Vec<BatchView> = batches
        .iter()
        .map(|b| BatchView::new(b, now, near_expiry_days))
        .collect();
    views.sort_by(|a, b| {
        a.variety
            .cmp(&b.variety)
            .then(a.harvest_date.cmp(&b.harvest_date))
    });
    views
}

/// Batches that need attention soon: not yet expired, few days left
pub fn near_expiry_alerts(views: &[BatchView]) -> Vec<BatchView> {
    views.iter().filter(|v| v.near_expiry).cloned().collect()
}

/// Result of taking stems out of a batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WithdrawalOutcome {
    /// Quantity actually removed (never more than was in stock)
    pub withdrawn: i32,
    pub remaining: i32,
    /// The batch reached zero and leaves the active set
    pub depleted: bool,
}

/// Take `requested` stems from a batch holding `current`.
///
/// Asking for more than is in stock empties the batch instead of failing.
pub fn apply_withdrawal(current: i32, requested: i32) -> Result<WithdrawalOutcome, LifecycleError> {
    if requested <= 0 {
        return Err(LifecycleError::NonPositiveWithdrawal(requested));
    }
    if current < 0 {
        return Err(LifecycleError::NegativeQuantity(current));
    }

    let withdrawn = requested.min(current);
    let remaining = current - withdrawn;
    Ok(WithdrawalOutcome {
        withdrawn,
        remaining,
        depleted: remaining == 0,
    })
}

/// Batch as stored in the legacy JSON stock file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegacyStockItem {
    #[serde(rename = "variedade")]
    pub variety: String,
    #[serde(rename = "data_colheita")]
    pub harvest_date: NaiveDate,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        d.and_hms_opt(h, m, 0).unwrap()
    }

    fn batch(variety: &str, harvest: NaiveDate, quantity: i32) -> Batch {
        Batch {
            id: Uuid::new_v4(),
            variety: variety.to_string(),
            harvest_date: harvest,
            quantity,
            validity_days: 7,
            expiration_date: expiration_date(harvest, 7).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiration_is_harvest_plus_validity() {
        assert_eq!(expiration_date(date(2024, 5, 1), 7), Ok(date(2024, 5, 8)));
        assert_eq!(expiration_date(date(2024, 5, 1), 5), Ok(date(2024, 5, 6)));
        // Month rollover
        assert_eq!(expiration_date(date(2024, 2, 26), 7), Ok(date(2024, 3, 4)));
    }

    #[test]
    fn test_expiration_rejects_zero_validity() {
        assert_eq!(
            expiration_date(date(2024, 5, 1), 0),
            Err(LifecycleError::InvalidValidity(0))
        );
    }

    #[test]
    fn test_expired_from_start_of_expiration_day() {
        let exp = date(2024, 5, 8);
        assert!(!is_expired(exp, at(date(2024, 5, 7), 23, 59)));
        assert!(!is_expired(exp, at(exp, 0, 0)));
        assert!(is_expired(exp, at(exp, 0, 1)));
        assert!(is_expired(exp, at(date(2024, 5, 9), 12, 0)));
    }

    #[test]
    fn test_days_remaining_goes_negative() {
        let exp = date(2024, 5, 8);
        assert_eq!(days_remaining(exp, date(2024, 5, 1)), 7);
        assert_eq!(days_remaining(exp, date(2024, 5, 8)), 0);
        assert_eq!(days_remaining(exp, date(2024, 5, 10)), -2);
    }

    #[test]
    fn test_near_expiry_window() {
        let exp = date(2024, 5, 8);
        assert!(!is_near_expiry(exp, at(date(2024, 5, 5), 9, 0), 2));
        assert!(is_near_expiry(exp, at(date(2024, 5, 6), 9, 0), 2));
        assert!(is_near_expiry(exp, at(date(2024, 5, 7), 9, 0), 2));
        // Expired batches are not alerts
        assert!(!is_near_expiry(exp, at(date(2024, 5, 8), 9, 0), 2));
    }

    #[test]
    fn test_status_agrees_with_lifecycle_rules() {
        let exp = date(2024, 5, 8);
        for day in 0..12 {
            for (h, m) in [(0, 0), (0, 1), (12, 0), (23, 59)] {
                let now = at(date(2024, 4, 30) + Duration::days(day), h, m);
                for threshold in 0..4 {
                    let status = BatchStatus::evaluate(exp, now, threshold);
                    assert_eq!(status.expired, is_expired(exp, now));
                    assert_eq!(status.days_remaining, days_remaining(exp, now.date()));
                    assert_eq!(status.near_expiry, is_near_expiry(exp, now, threshold));
                }
            }
        }
    }

    #[test]
    fn test_status_label() {
        let exp = date(2024, 5, 8);
        assert_eq!(BatchStatus::evaluate(exp, at(date(2024, 5, 2), 8, 0), 2).label(), "valid");
        assert_eq!(BatchStatus::evaluate(exp, at(date(2024, 5, 7), 8, 0), 2).label(), "expiring");
        assert_eq!(BatchStatus::evaluate(exp, at(date(2024, 5, 9), 8, 0), 2).label(), "expired");
    }

    #[test]
    fn test_evaluate_batches_sorted_by_variety_then_date() {
        let batches = vec![
            batch("Rosa", date(2024, 5, 3), 10),
            batch("Girassol", date(2024, 5, 2), 5),
            batch("Rosa", date(2024, 5, 1), 8),
        ];
        let views = evaluate_batches(&batches, at(date(2024, 5, 4), 10, 0), 2);

        let order: Vec<(&str, NaiveDate)> = views
            .iter()
            .map(|v| (v.variety.as_str(), v.harvest_date))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Girassol", date(2024, 5, 2)),
                ("Rosa", date(2024, 5, 1)),
                ("Rosa", date(2024, 5, 3)),
            ]
        );
    }

    #[test]
    fn test_near_expiry_alerts_filter() {
        let batches = vec![
            batch("Rosa", date(2024, 5, 1), 10),  // expires 05-08, 1 day left
            batch("Lírio", date(2024, 5, 6), 4),  // expires 05-13, 6 days left
            batch("Tulipa", date(2024, 4, 20), 3), // expired
        ];
        let views = evaluate_batches(&batches, at(date(2024, 5, 7), 10, 0), 2);
        let alerts = near_expiry_alerts(&views);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].variety, "Rosa");
        assert_eq!(alerts[0].days_remaining, 1);
    }

    #[test]
    fn test_withdrawal_partial() {
        let outcome = apply_withdrawal(10, 4).unwrap();
        assert_eq!(
            outcome,
            WithdrawalOutcome {
                withdrawn: 4,
                remaining: 6,
                depleted: false
            }
        );
    }

    #[test]
    fn test_withdrawal_exact_depletes() {
        let outcome = apply_withdrawal(10, 10).unwrap();
        assert_eq!(outcome.remaining, 0);
        assert!(outcome.depleted);
    }

    #[test]
    fn test_withdrawal_over_stock_clamps_to_zero() {
        let outcome = apply_withdrawal(3, 50).unwrap();
        assert_eq!(outcome.withdrawn, 3);
        assert_eq!(outcome.remaining, 0);
        assert!(outcome.depleted);
    }

    #[test]
    fn test_withdrawal_rejects_non_positive() {
        assert_eq!(
            apply_withdrawal(10, 0),
            Err(LifecycleError::NonPositiveWithdrawal(0))
        );
        assert!(apply_withdrawal(10, -5).is_err());
    }

    #[test]
    fn test_legacy_item_uses_portuguese_keys() {
        let json = r#"{"variedade": "Rosa", "data_colheita": "2024-05-01", "quantidade": 12}"#;
        let item: LegacyStockItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.variety, "Rosa");
        assert_eq!(item.harvest_date, date(2024, 5, 1));
        assert_eq!(item.quantity, 12);
    }
}
