//! Batch service: stock entry, listing, expiry alerts and withdrawals

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use shared::{
    apply_withdrawal, evaluate_batches, expiration_date, near_expiry_alerts, normalize_variety,
    total_quantity, validate_batch_quantity, validate_harvest_date, validate_variety, Batch,
    BatchView, DateRange, LegacyStockItem,
};

use super::StockPolicy;
use crate::error::{AppError, AppResult};

/// Batch service for managing flower stock
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
    policy: StockPolicy,
}

/// Database row for a batch
#[derive(Debug, Clone, FromRow)]
struct BatchRow {
    id: Uuid,
    variety: String,
    harvest_date: NaiveDate,
    quantity: i32,
    validity_days: i32,
    expiration_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Self {
            id: row.id,
            variety: row.variety,
            harvest_date: row.harvest_date,
            quantity: row.quantity,
            validity_days: row.validity_days,
            expiration_date: row.expiration_date,
            created_at: row.created_at,
        }
    }
}

/// Input for adding a batch to stock
#[derive(Debug, Deserialize, Validate)]
pub struct AddBatchInput {
    #[validate(length(min = 1, max = 100))]
    pub variety: String,
    pub harvest_date: NaiveDate,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Input for withdrawing stems from a batch
#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawInput {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Which batches a listing covers, by harvest date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFilter {
    All,
    CurrentWeek,
    Range(DateRange),
}

impl BatchFilter {
    /// Build a filter from optional query parameters
    pub fn from_query(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        week: Option<&str>,
    ) -> AppResult<Self> {
        match (start_date, end_date, week) {
            (None, None, None) => Ok(BatchFilter::All),
            (None, None, Some("current")) => Ok(BatchFilter::CurrentWeek),
            (None, None, Some(other)) => Err(AppError::Validation {
                field: "week".to_string(),
                message: format!("Unsupported week value '{}', use 'current'", other),
                message_pt: format!("Valor de semana '{}' inválido, use 'current'", other),
            }),
            (Some(start), Some(end), None) => {
                let range = DateRange::new(start, end).map_err(|msg| {
                    AppError::invalid("start_date", msg, "A data inicial deve ser anterior à final")
                })?;
                Ok(BatchFilter::Range(range))
            }
            (_, _, Some(_)) => Err(AppError::invalid(
                "week",
                "Use either week or a date range, not both",
                "Use a semana ou um intervalo de datas, não ambos",
            )),
            _ => Err(AppError::invalid(
                "start_date/end_date",
                "Both start_date and end_date are required",
                "Informe data inicial e data final",
            )),
        }
    }

    /// Harvest-date range this filter resolves to on `today`
    pub fn resolve(&self, today: NaiveDate) -> Option<DateRange> {
        match self {
            BatchFilter::All => None,
            BatchFilter::CurrentWeek => Some(DateRange::week_of(today)),
            BatchFilter::Range(range) => Some(*range),
        }
    }
}

/// Current stock with derived status
#[derive(Debug, Clone, Serialize)]
pub struct StockListing {
    pub range: Option<DateRange>,
    pub batches: Vec<BatchView>,
    pub alerts: Vec<BatchView>,
    pub total_quantity: i64,
}

/// Outcome of a withdrawal request
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalResult {
    pub batch_id: Uuid,
    pub variety: String,
    pub withdrawn: i32,
    pub remaining: i32,
    /// The batch hit zero and was deleted
    pub removed: bool,
}

/// Outcome of purging expired batches
#[derive(Debug, Clone, Serialize)]
pub struct ExpiredRemoval {
    pub removed: u64,
    pub batch_ids: Vec<Uuid>,
}

/// Outcome of a legacy stock import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

const BATCH_COLUMNS: &str =
    "id, variety, harvest_date, quantity, validity_days, expiration_date, created_at";

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool, policy: StockPolicy) -> Self {
        Self { db, policy }
    }

    /// Validate and normalize a new batch, returning the variety to store
    fn check_new_batch(&self, variety: &str, harvest_date: NaiveDate, quantity: i32) -> AppResult<String> {
        validate_variety(variety)
            .map_err(|msg| AppError::invalid("variety", msg, "Informe a variedade"))?;
        validate_batch_quantity(quantity)
            .map_err(|msg| AppError::invalid("quantity", msg, "A quantidade deve ser pelo menos 1"))?;
        validate_harvest_date(harvest_date, self.policy.clock.today()).map_err(|msg| {
            AppError::invalid("harvest_date", msg, "A data de colheita não pode ser no futuro")
        })?;
        Ok(normalize_variety(variety))
    }

    /// Insert a batch and its harvest entry inside an open transaction
    async fn insert_batch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variety: &str,
        harvest_date: NaiveDate,
        quantity: i32,
    ) -> AppResult<Batch> {
        let validity_days = self.policy.validity_days;
        let expires_on = expiration_date(harvest_date, validity_days)?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO batches (variety, harvest_date, quantity, validity_days, expiration_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(variety)
        .bind(harvest_date)
        .bind(quantity)
        .bind(validity_days)
        .bind(expires_on)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO harvest_entries (batch_id, variety, quantity, harvest_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.id)
        .bind(variety)
        .bind(quantity)
        .bind(harvest_date)
        .execute(&mut **tx)
        .await?;

        Ok(Batch::from(row))
    }

    /// Add a batch to stock and log the harvest entry
    pub async fn add_batch(&self, input: AddBatchInput) -> AppResult<BatchView> {
        input.validate()?;
        let variety = self.check_new_batch(&input.variety, input.harvest_date, input.quantity)?;

        let mut tx = self.db.begin().await?;
        let batch = self
            .insert_batch(&mut tx, &variety, input.harvest_date, input.quantity)
            .await?;
        tx.commit().await?;

        tracing::info!(
            batch_id = %batch.id,
            variety = %batch.variety,
            quantity = batch.quantity,
            expiration_date = %batch.expiration_date,
            "Batch added to stock"
        );

        Ok(BatchView::new(
            &batch,
            self.policy.clock.now(),
            self.policy.near_expiry_days,
        ))
    }

    /// Load batches, optionally restricted to a harvest-date range
    pub async fn fetch_batches(&self, range: Option<DateRange>) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            SELECT {}
            FROM batches
            WHERE quantity > 0
              AND ($1::date IS NULL OR harvest_date >= $1)
              AND ($2::date IS NULL OR harvest_date <= $2)
            ORDER BY variety, harvest_date
            "#,
            BATCH_COLUMNS
        ))
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Batch::from).collect())
    }

    /// List stock with derived status, alerts and total quantity
    pub async fn list(&self, filter: BatchFilter) -> AppResult<StockListing> {
        let range = filter.resolve(self.policy.clock.today());
        let batches = self.fetch_batches(range).await?;
        let views = evaluate_batches(&batches, self.policy.clock.now(), self.policy.near_expiry_days);

        Ok(StockListing {
            range,
            alerts: near_expiry_alerts(&views),
            total_quantity: total_quantity(&views),
            batches: views,
        })
    }

    /// Batches about to expire (not yet expired)
    pub async fn alerts(&self) -> AppResult<Vec<BatchView>> {
        let batches = self.fetch_batches(None).await?;
        let views = evaluate_batches(&batches, self.policy.clock.now(), self.policy.near_expiry_days);
        Ok(near_expiry_alerts(&views))
    }

    /// Take stems out of a batch, deleting it once empty
    pub async fn withdraw(&self, batch_id: Uuid, input: WithdrawInput) -> AppResult<WithdrawalResult> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM batches WHERE id = $1 FOR UPDATE",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        let outcome = apply_withdrawal(row.quantity, input.quantity)?;

        if outcome.depleted {
            sqlx::query("DELETE FROM batches WHERE id = $1")
                .bind(batch_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE batches SET quantity = $1 WHERE id = $2")
                .bind(outcome.remaining)
                .bind(batch_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if outcome.withdrawn < input.quantity {
            tracing::warn!(
                batch_id = %batch_id,
                requested = input.quantity,
                withdrawn = outcome.withdrawn,
                "Withdrawal exceeded stock, batch emptied"
            );
        }
        tracing::info!(
            batch_id = %batch_id,
            withdrawn = outcome.withdrawn,
            remaining = outcome.remaining,
            removed = outcome.depleted,
            "Stock withdrawn"
        );

        Ok(WithdrawalResult {
            batch_id,
            variety: row.variety,
            withdrawn: outcome.withdrawn,
            remaining: outcome.remaining,
            removed: outcome.depleted,
        })
    }

    /// Delete every batch that is expired as of local now
    pub async fn remove_expired(&self) -> AppResult<ExpiredRemoval> {
        let now = self.policy.clock.now();
        let expired: Vec<Uuid> = self
            .fetch_batches(None)
            .await?
            .into_iter()
            .filter(|b| b.status(now, self.policy.near_expiry_days).expired)
            .map(|b| b.id)
            .collect();

        if expired.is_empty() {
            return Ok(ExpiredRemoval {
                removed: 0,
                batch_ids: expired,
            });
        }

        let result = sqlx::query("DELETE FROM batches WHERE id = ANY($1)")
            .bind(&expired[..])
            .execute(&self.db)
            .await?;

        tracing::info!(removed = result.rows_affected(), "Expired batches removed");

        Ok(ExpiredRemoval {
            removed: result.rows_affected(),
            batch_ids: expired,
        })
    }

    /// Load the JSON stock file of the previous system.
    ///
    /// Empty items are skipped, as are items that fail validation.
    pub async fn import_legacy(&self, items: Vec<LegacyStockItem>) -> AppResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut tx = self.db.begin().await?;

        for item in items {
            if item.quantity <= 0 {
                summary.skipped += 1;
                continue;
            }
            let variety = match self.check_new_batch(&item.variety, item.harvest_date, item.quantity) {
                Ok(variety) => variety,
                Err(e) => {
                    tracing::warn!("Skipping legacy item {:?}: {}", item, e);
                    summary.skipped += 1;
                    continue;
                }
            };
            self.insert_batch(&mut tx, &variety, item.harvest_date, item.quantity)
                .await?;
            summary.imported += 1;
        }

        tx.commit().await?;

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Legacy stock imported"
        );

        Ok(summary)
    }
}
