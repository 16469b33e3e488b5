//! Harvest target ("meta") service

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::{
    compute_progress, normalize_variety, validate_harvest_date, validate_tally,
    validate_target_stems, validate_variety, ContainerTally, DateRange, HarvestRecord,
    HarvestTarget, LocalClock, TargetProgress,
};

use crate::error::{AppError, AppResult};

/// Target service for harvest goals and tallied harvests
#[derive(Clone)]
pub struct TargetService {
    db: PgPool,
    clock: LocalClock,
}

/// Database row for a target
#[derive(Debug, Clone, FromRow)]
struct TargetRow {
    variety: String,
    target_stems: i32,
    updated_at: DateTime<Utc>,
}

impl From<TargetRow> for HarvestTarget {
    fn from(row: TargetRow) -> Self {
        Self {
            variety: row.variety,
            target_stems: row.target_stems,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a tallied harvest
#[derive(Debug, Clone, FromRow)]
struct RecordRow {
    id: Uuid,
    variety: String,
    harvest_date: NaiveDate,
    bunches: i32,
    buckets: i32,
    crates: i32,
    stems: i64,
    recorded_at: DateTime<Utc>,
}

impl From<RecordRow> for HarvestRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            id: row.id,
            variety: row.variety,
            harvest_date: row.harvest_date,
            tally: ContainerTally {
                bunches: row.bunches,
                buckets: row.buckets,
                crates: row.crates,
            },
            stems: row.stems,
            recorded_at: row.recorded_at,
        }
    }
}

/// Input for setting a variety's target
#[derive(Debug, Deserialize, Validate)]
pub struct SetTargetInput {
    #[validate(length(min = 1, max = 100))]
    pub variety: String,
    #[validate(range(min = 0))]
    pub target_stems: i32,
}

/// Input for recording a tallied harvest
#[derive(Debug, Deserialize, Validate)]
pub struct RecordHarvestInput {
    #[validate(length(min = 1, max = 100))]
    pub variety: String,
    pub harvest_date: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub bunches: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub buckets: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub crates: i32,
}

impl RecordHarvestInput {
    pub fn tally(&self) -> ContainerTally {
        ContainerTally {
            bunches: self.bunches,
            buckets: self.buckets,
            crates: self.crates,
        }
    }
}

impl TargetService {
    /// Create a new TargetService instance
    pub fn new(db: PgPool, clock: LocalClock) -> Self {
        Self { db, clock }
    }

    /// Create or replace the target for a variety
    pub async fn upsert_target(&self, input: SetTargetInput) -> AppResult<HarvestTarget> {
        input.validate()?;
        validate_variety(&input.variety)
            .map_err(|msg| AppError::invalid("variety", msg, "Informe a variedade"))?;
        validate_target_stems(input.target_stems)
            .map_err(|msg| AppError::invalid("target_stems", msg, "A meta não pode ser negativa"))?;

        let variety = normalize_variety(&input.variety);
        let row = sqlx::query_as::<_, TargetRow>(
            r#"
            INSERT INTO harvest_targets (variety, target_stems)
            VALUES ($1, $2)
            ON CONFLICT ((LOWER(variety)))
            DO UPDATE SET target_stems = EXCLUDED.target_stems, updated_at = NOW()
            RETURNING variety, target_stems, updated_at
            "#,
        )
        .bind(&variety)
        .bind(input.target_stems)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(variety = %variety, target_stems = input.target_stems, "Harvest target set");

        Ok(HarvestTarget::from(row))
    }

    /// List all targets by variety
    pub async fn list_targets(&self) -> AppResult<Vec<HarvestTarget>> {
        let rows = sqlx::query_as::<_, TargetRow>(
            "SELECT variety, target_stems, updated_at FROM harvest_targets ORDER BY variety",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HarvestTarget::from).collect())
    }

    /// Remove the target of a variety
    pub async fn delete_target(&self, variety: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM harvest_targets WHERE LOWER(variety) = LOWER($1)")
            .bind(normalize_variety(variety))
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Harvest target".to_string()));
        }

        Ok(())
    }

    /// Validate a tally, returning the variety to store and the counts
    fn check_record(&self, input: &RecordHarvestInput) -> AppResult<(String, ContainerTally)> {
        input.validate()?;
        validate_variety(&input.variety)
            .map_err(|msg| AppError::invalid("variety", msg, "Informe a variedade"))?;
        validate_harvest_date(input.harvest_date, self.clock.today()).map_err(|msg| {
            AppError::invalid("harvest_date", msg, "A data de colheita não pode ser no futuro")
        })?;
        let tally = input.tally();
        validate_tally(&tally).map_err(|msg| {
            AppError::invalid("containers", msg, "Informe ao menos um recipiente, sem valores negativos")
        })?;
        Ok((normalize_variety(&input.variety), tally))
    }

    /// Record container counts for a harvest
    pub async fn record_harvest(&self, input: RecordHarvestInput) -> AppResult<HarvestRecord> {
        let (variety, tally) = self.check_record(&input)?;
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO harvest_records (variety, harvest_date, bunches, buckets, crates, stems)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, variety, harvest_date, bunches, buckets, crates, stems, recorded_at
            "#,
        )
        .bind(&variety)
        .bind(input.harvest_date)
        .bind(tally.bunches)
        .bind(tally.buckets)
        .bind(tally.crates)
        .bind(tally.stems())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(variety = %variety, stems = row.stems, "Harvest tally recorded");

        Ok(HarvestRecord::from(row))
    }

    /// Tallied harvests, newest first
    pub async fn list_records(&self, range: Option<DateRange>) -> AppResult<Vec<HarvestRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, variety, harvest_date, bunches, buckets, crates, stems, recorded_at
            FROM harvest_records
            WHERE ($1::date IS NULL OR harvest_date >= $1)
              AND ($2::date IS NULL OR harvest_date <= $2)
            ORDER BY harvest_date DESC, recorded_at DESC
            "#,
        )
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HarvestRecord::from).collect())
    }

    /// Progress of every variety toward its target
    pub async fn progress(&self) -> AppResult<Vec<TargetProgress>> {
        let targets = self.list_targets().await?;
        let records = self.list_records(None).await?;
        Ok(compute_progress(&targets, &records))
    }
}
