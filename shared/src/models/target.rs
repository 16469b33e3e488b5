//! Harvest targets ("metas") and per-container harvest tallies

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::same_variety;

/// Target number of stems to harvest for a variety
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestTarget {
    pub variety: String,
    pub target_stems: i32,
    pub updated_at: DateTime<Utc>,
}

/// Container a harvest is counted in. Each holds a fixed number of stems.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Maço
    Bunch,
    /// Balde
    Bucket,
    /// Caixa
    Crate,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [ContainerKind::Bunch, ContainerKind::Bucket, ContainerKind::Crate];

    pub fn stems_per_container(&self) -> i32 {
        match self {
            ContainerKind::Bunch => 10,
            ContainerKind::Bucket => 25,
            ContainerKind::Crate => 50,
        }
    }
}

/// Container counts for one harvest
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerTally {
    pub bunches: i32,
    pub buckets: i32,
    pub crates: i32,
}

impl ContainerTally {
    pub fn count(&self, kind: ContainerKind) -> i32 {
        match kind {
            ContainerKind::Bunch => self.bunches,
            ContainerKind::Bucket => self.buckets,
            ContainerKind::Crate => self.crates,
        }
    }

    /// Total stems across all containers
    pub fn stems(&self) -> i64 {
        ContainerKind::ALL
            .iter()
            .map(|k| i64::from(self.count(*k)) * i64::from(k.stems_per_container()))
            .sum()
    }

    pub fn has_negative(&self) -> bool {
        self.bunches < 0 || self.buckets < 0 || self.crates < 0
    }

    pub fn is_empty(&self) -> bool {
        self.bunches == 0 && self.buckets == 0 && self.crates == 0
    }
}

/// A tallied harvest used for target tracking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestRecord {
    pub id: Uuid,
    pub variety: String,
    pub harvest_date: NaiveDate,
    pub tally: ContainerTally,
    pub stems: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Share of the target reached, in percent with two decimals.
///
/// Overshooting is reported as-is (above 100). A zero target reports 0.
pub fn progress_percent(harvested_stems: i64, target_stems: i32) -> Decimal {
    if target_stems <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(harvested_stems) * Decimal::ONE_HUNDRED / Decimal::from(target_stems))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Progress of one variety toward its target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetProgress {
    pub variety: String,
    pub target_stems: i32,
    pub harvested_stems: i64,
    pub remaining_stems: i64,
    pub percent: Decimal,
    pub reached: bool,
}

impl TargetProgress {
    pub fn new(variety: impl Into<String>, target_stems: i32, harvested_stems: i64) -> Self {
        Self {
            variety: variety.into(),
            target_stems,
            harvested_stems,
            remaining_stems: (i64::from(target_stems) - harvested_stems).max(0),
            percent: progress_percent(harvested_stems, target_stems),
            reached: harvested_stems >= i64::from(target_stems),
        }
    }
}

/// Progress for every target, summing the records of each variety
pub fn compute_progress(targets: &[HarvestTarget], records: &[HarvestRecord]) -> Vec<TargetProgress> {
    let mut progress: Vec<TargetProgress> = targets
        .iter()
        .map(|t| {
            let harvested = records
                .iter()
                .filter(|r| same_variety(&r.variety, &t.variety))
                .map(|r| r.stems)
                .sum();
            TargetProgress::new(t.variety.clone(), t.target_stems, harvested)
        })
        .collect();
    progress.sort_by(|a, b| a.variety.cmp(&b.variety));
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(variety: &str, tally: ContainerTally) -> HarvestRecord {
        HarvestRecord {
            id: Uuid::new_v4(),
            variety: variety.to_string(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            stems: tally.stems(),
            tally,
            recorded_at: Utc::now(),
        }
    }

    fn target(variety: &str, stems: i32) -> HarvestTarget {
        HarvestTarget {
            variety: variety.to_string(),
            target_stems: stems,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_container_multipliers() {
        assert_eq!(ContainerKind::Bunch.stems_per_container(), 10);
        assert_eq!(ContainerKind::Bucket.stems_per_container(), 25);
        assert_eq!(ContainerKind::Crate.stems_per_container(), 50);
    }

    #[test]
    fn test_tally_stems() {
        let tally = ContainerTally {
            bunches: 3,
            buckets: 2,
            crates: 1,
        };
        // 30 + 50 + 50
        assert_eq!(tally.stems(), 130);
        assert!(ContainerTally::default().is_empty());
    }

    #[test]
    fn test_progress_percent_rounding() {
        assert_eq!(progress_percent(1, 3), dec("33.33"));
        assert_eq!(progress_percent(2, 3), dec("66.67"));
        assert_eq!(progress_percent(150, 100), dec("150"));
        assert_eq!(progress_percent(10, 0), Decimal::ZERO);
    }

    #[test]
    fn test_compute_progress_per_variety() {
        let targets = vec![target("Rosa", 200), target("Girassol", 100)];
        let records = vec![
            record("Rosa", ContainerTally { bunches: 5, buckets: 0, crates: 1 }),
            record("Rosa", ContainerTally { bunches: 0, buckets: 2, crates: 0 }),
            record("Lírio", ContainerTally { bunches: 9, buckets: 0, crates: 0 }),
        ];

        let progress = compute_progress(&targets, &records);
        assert_eq!(progress.len(), 2);

        let girassol = &progress[0];
        assert_eq!(girassol.variety, "Girassol");
        assert_eq!(girassol.harvested_stems, 0);
        assert_eq!(girassol.remaining_stems, 100);
        assert!(!girassol.reached);

        let rosa = &progress[1];
        assert_eq!(rosa.harvested_stems, 150);
        assert_eq!(rosa.percent, dec("75"));
        assert_eq!(rosa.remaining_stems, 50);
    }

    #[test]
    fn test_compute_progress_ignores_case_and_spacing() {
        let targets = vec![target("Rosa Branca", 100)];
        let records = vec![
            record("rosa branca", ContainerTally { bunches: 2, buckets: 0, crates: 0 }),
            record("ROSA  Branca ", ContainerTally { bunches: 0, buckets: 0, crates: 1 }),
            record("Rosa", ContainerTally { bunches: 9, buckets: 0, crates: 0 }),
        ];

        let progress = compute_progress(&targets, &records);
        assert_eq!(progress[0].variety, "Rosa Branca");
        assert_eq!(progress[0].harvested_stems, 70);
        assert_eq!(progress[0].percent, dec("70"));
    }

    #[test]
    fn test_progress_reached_when_overshooting() {
        let p = TargetProgress::new("Rosa", 100, 130);
        assert!(p.reached);
        assert_eq!(p.remaining_stems, 0);
        assert_eq!(p.percent, dec("130"));
    }
}
