//! Reporting service for stock reports, the dashboard and data export

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;

use shared::{
    evaluate_batches, totals_by_variety, total_quantity, BatchView, Dashboard, DateRange,
    VarietyTotal,
};

use super::{BatchService, HarvestService, StockPolicy, TargetService};
use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
    policy: StockPolicy,
}

/// Printable stock report
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    /// Local time the report was produced
    pub generated_at: NaiveDateTime,
    pub range: Option<DateRange>,
    pub batches: Vec<BatchView>,
    pub by_variety: Vec<VarietyTotal>,
    pub total_quantity: i64,
}

/// Flat report line for CSV export
#[derive(Debug, Clone, Serialize)]
pub struct StockReportLine {
    pub variety: String,
    pub quantity: i32,
    pub harvest_date: String,
    pub expiration_date: String,
    pub days_remaining: i64,
    pub status: &'static str,
}

impl From<&BatchView> for StockReportLine {
    fn from(view: &BatchView) -> Self {
        Self {
            variety: view.variety.clone(),
            quantity: view.quantity,
            harvest_date: view.harvest_date.format("%Y-%m-%d").to_string(),
            expiration_date: view.expiration_date.format("%Y-%m-%d").to_string(),
            days_remaining: view.days_remaining,
            status: view.label(),
        }
    }
}

impl StockReport {
    pub fn lines(&self) -> Vec<StockReportLine> {
        self.batches.iter().map(StockReportLine::from).collect()
    }
}

impl ReportingService {
    pub fn new(db: PgPool, policy: StockPolicy) -> Self {
        Self { db, policy }
    }

    /// Stock report, optionally restricted to a harvest-date range
    pub async fn stock_report(&self, range: Option<DateRange>) -> AppResult<StockReport> {
        let batches = BatchService::new(self.db.clone(), self.policy)
            .fetch_batches(range)
            .await?;
        let now = self.policy.clock.now();
        let views = evaluate_batches(&batches, now, self.policy.near_expiry_days);

        Ok(StockReport {
            generated_at: now,
            range,
            by_variety: totals_by_variety(&views),
            total_quantity: total_quantity(&views),
            batches: views,
        })
    }

    /// Totals for the dashboard page
    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        let batches = BatchService::new(self.db.clone(), self.policy)
            .fetch_batches(None)
            .await?;
        let stock = evaluate_batches(&batches, self.policy.clock.now(), self.policy.near_expiry_days);
        let entries = HarvestService::new(self.db.clone()).history(None, None).await?;
        let targets = TargetService::new(self.db.clone(), self.policy.clock).progress().await?;

        Ok(Dashboard::build(&stock, &entries, targets))
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn view(variety: &str, quantity: i32, expired: bool, near_expiry: bool, days: i64) -> BatchView {
        let harvest = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        BatchView {
            id: Uuid::new_v4(),
            variety: variety.to_string(),
            quantity,
            harvest_date: harvest,
            expiration_date: NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
            expired,
            days_remaining: days,
            near_expiry,
        }
    }

    #[test]
    fn test_report_line_status() {
        assert_eq!(StockReportLine::from(&view("Rosa", 1, true, false, -1)).status, "expired");
        assert_eq!(StockReportLine::from(&view("Rosa", 1, false, true, 1)).status, "expiring");
        assert_eq!(StockReportLine::from(&view("Rosa", 1, false, false, 5)).status, "valid");
    }

    #[test]
    fn test_export_to_csv() {
        let lines = vec![
            StockReportLine::from(&view("Rosa", 12, false, true, 2)),
            StockReportLine::from(&view("Girassol", 3, false, false, 6)),
        ];
        let csv = ReportingService::export_to_csv(&lines).unwrap();
        let mut rows = csv.lines();

        assert_eq!(
            rows.next(),
            Some("variety,quantity,harvest_date,expiration_date,days_remaining,status")
        );
        assert_eq!(rows.next(), Some("Rosa,12,2024-05-01,2024-05-08,2,expiring"));
        assert_eq!(rows.next(), Some("Girassol,3,2024-05-01,2024-05-08,6,valid"));
        assert_eq!(rows.next(), None);
    }
}
