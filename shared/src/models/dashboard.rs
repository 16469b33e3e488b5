//! Dashboard aggregates

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BatchView, HarvestEntry, TargetProgress};
use crate::types::month_key;
use crate::validation::{normalize_variety, variety_key};

/// Quantity summed for one variety
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VarietyTotal {
    pub variety: String,
    pub quantity: i64,
    pub count: i64,
}

/// Quantity summed for one calendar month (`YYYY-MM`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: String,
    pub quantity: i64,
    pub count: i64,
}

/// Anything that contributes a quantity of a variety on a date
pub trait Quantified {
    fn variety(&self) -> &str;
    fn quantity(&self) -> i64;
    fn date(&self) -> NaiveDate;
}

impl Quantified for BatchView {
    fn variety(&self) -> &str {
        &self.variety
    }
    fn quantity(&self) -> i64 {
        i64::from(self.quantity)
    }
    fn date(&self) -> NaiveDate {
        self.harvest_date
    }
}

impl Quantified for HarvestEntry {
    fn variety(&self) -> &str {
        &self.variety
    }
    fn quantity(&self) -> i64 {
        i64::from(self.quantity)
    }
    fn date(&self) -> NaiveDate {
        self.harvest_date
    }
}

pub fn total_quantity<T: Quantified>(items: &[T]) -> i64 {
    items.iter().map(Quantified::quantity).sum()
}

/// Totals per variety, alphabetical.
///
/// Spellings that differ only in case or spacing are grouped under the first one seen.
pub fn totals_by_variety<T: Quantified>(items: &[T]) -> Vec<VarietyTotal> {
    let mut acc: BTreeMap<String, VarietyTotal> = BTreeMap::new();
    for item in items {
        let slot = acc
            .entry(variety_key(item.variety()))
            .or_insert_with(|| VarietyTotal {
                variety: normalize_variety(item.variety()),
                quantity: 0,
                count: 0,
            });
        slot.quantity += item.quantity();
        slot.count += 1;
    }
    acc.into_values().collect()
}

/// Totals per month of the item date, oldest first
pub fn totals_by_month<T: Quantified>(items: &[T]) -> Vec<MonthlyTotal> {
    let mut acc: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for item in items {
        let slot = acc.entry(month_key(item.date())).or_default();
        slot.0 += item.quantity();
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(month, (quantity, count))| MonthlyTotal {
            month,
            quantity,
            count,
        })
        .collect()
}

/// Everything the dashboard page shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub total_in_stock: i64,
    pub active_batches: i64,
    pub near_expiry_batches: i64,
    pub expired_batches: i64,
    pub stock_by_variety: Vec<VarietyTotal>,
    pub harvested_by_variety: Vec<VarietyTotal>,
    pub harvested_by_month: Vec<MonthlyTotal>,
    pub targets: Vec<TargetProgress>,
}

impl Dashboard {
    pub fn build(stock: &[BatchView], entries: &[HarvestEntry], targets: Vec<TargetProgress>) -> Self {
        Self {
            total_in_stock: total_quantity(stock),
            active_batches: stock.len() as i64,
            near_expiry_batches: stock.iter().filter(|b| b.near_expiry).count() as i64,
            expired_batches: stock.iter().filter(|b| b.expired).count() as i64,
            stock_by_variety: totals_by_variety(stock),
            harvested_by_variety: totals_by_variety(entries),
            harvested_by_month: totals_by_month(entries),
            targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(variety: &str, quantity: i32, y: i32, m: u32, d: u32) -> HarvestEntry {
        HarvestEntry {
            id: Uuid::new_v4(),
            batch_id: None,
            variety: variety.to_string(),
            quantity,
            harvest_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            recorded_at: Utc::now(),
        }
    }

    fn view(variety: &str, quantity: i32, expired: bool, near_expiry: bool) -> BatchView {
        let harvest = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        BatchView {
            id: Uuid::new_v4(),
            variety: variety.to_string(),
            quantity,
            harvest_date: harvest,
            expiration_date: harvest + chrono::Duration::days(7),
            expired,
            days_remaining: 0,
            near_expiry,
        }
    }

    #[test]
    fn test_totals_by_variety() {
        let entries = vec![
            entry("Rosa", 10, 2024, 5, 1),
            entry("Girassol", 4, 2024, 5, 2),
            entry("Rosa", 6, 2024, 6, 3),
        ];
        let totals = totals_by_variety(&entries);
        assert_eq!(
            totals,
            vec![
                VarietyTotal { variety: "Girassol".into(), quantity: 4, count: 1 },
                VarietyTotal { variety: "Rosa".into(), quantity: 16, count: 2 },
            ]
        );
    }

    #[test]
    fn test_totals_by_variety_groups_spellings() {
        let entries = vec![
            entry("Rosa", 10, 2024, 5, 1),
            entry("rosa", 3, 2024, 5, 2),
            entry(" ROSA ", 2, 2024, 5, 3),
        ];
        assert_eq!(
            totals_by_variety(&entries),
            vec![VarietyTotal { variety: "Rosa".into(), quantity: 15, count: 3 }]
        );
    }

    #[test]
    fn test_totals_by_month_ordered() {
        let entries = vec![
            entry("Rosa", 6, 2024, 6, 3),
            entry("Rosa", 10, 2024, 5, 1),
            entry("Lírio", 2, 2024, 5, 30),
            entry("Rosa", 1, 2023, 12, 31),
        ];
        let months: Vec<(String, i64)> = totals_by_month(&entries)
            .into_iter()
            .map(|t| (t.month, t.quantity))
            .collect();
        assert_eq!(
            months,
            vec![
                ("2023-12".to_string(), 1),
                ("2024-05".to_string(), 12),
                ("2024-06".to_string(), 6),
            ]
        );
    }

    #[test]
    fn test_dashboard_counts() {
        let stock = vec![
            view("Rosa", 10, false, true),
            view("Rosa", 5, true, false),
            view("Girassol", 7, false, false),
        ];
        let entries = vec![entry("Rosa", 15, 2024, 5, 1)];
        let dashboard = Dashboard::build(&stock, &entries, vec![]);

        assert_eq!(dashboard.total_in_stock, 22);
        assert_eq!(dashboard.active_batches, 3);
        assert_eq!(dashboard.near_expiry_batches, 1);
        assert_eq!(dashboard.expired_batches, 1);
        assert_eq!(dashboard.stock_by_variety.len(), 2);
        assert_eq!(dashboard.harvested_by_month[0].month, "2024-05");
    }

    #[test]
    fn test_empty_inputs() {
        let empty: Vec<HarvestEntry> = vec![];
        assert_eq!(total_quantity(&empty), 0);
        assert!(totals_by_variety(&empty).is_empty());
        assert!(totals_by_month(&empty).is_empty());
    }
}
