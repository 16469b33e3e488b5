//! Harvest entry log models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One addition to stock. The log is append-only: entries outlive the
/// batches they created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestEntry {
    pub id: Uuid,
    /// Batch created by this entry, cleared once that batch is gone
    pub batch_id: Option<Uuid>,
    pub variety: String,
    pub quantity: i32,
    pub harvest_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}
