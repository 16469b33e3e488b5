//! Harvest history service over the append-only entry log

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{normalize_variety, DateRange, HarvestEntry};

use crate::error::AppResult;

/// Harvest service for reading the entry log
#[derive(Clone)]
pub struct HarvestService {
    db: PgPool,
}

/// Database row for a harvest entry
#[derive(Debug, Clone, FromRow)]
struct HarvestEntryRow {
    id: Uuid,
    batch_id: Option<Uuid>,
    variety: String,
    quantity: i32,
    harvest_date: NaiveDate,
    recorded_at: DateTime<Utc>,
}

impl From<HarvestEntryRow> for HarvestEntry {
    fn from(row: HarvestEntryRow) -> Self {
        Self {
            id: row.id,
            batch_id: row.batch_id,
            variety: row.variety,
            quantity: row.quantity,
            harvest_date: row.harvest_date,
            recorded_at: row.recorded_at,
        }
    }
}

impl HarvestService {
    /// Create a new HarvestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Harvest entries, newest first, optionally by harvest date and variety
    pub async fn history(
        &self,
        range: Option<DateRange>,
        variety: Option<&str>,
    ) -> AppResult<Vec<HarvestEntry>> {
        let rows = sqlx::query_as::<_, HarvestEntryRow>(
            r#"
            SELECT id, batch_id, variety, quantity, harvest_date, recorded_at
            FROM harvest_entries
            WHERE ($1::date IS NULL OR harvest_date >= $1)
              AND ($2::date IS NULL OR harvest_date <= $2)
              AND ($3::text IS NULL OR LOWER(variety) = LOWER($3))
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .bind(variety.map(normalize_variety))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HarvestEntry::from).collect())
    }
}
