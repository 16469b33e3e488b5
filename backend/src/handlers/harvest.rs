//! Harvest history HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::{DateRange, HarvestEntry};

use crate::error::{AppError, AppResult};
use crate::services::harvest::HarvestService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub variety: Option<String>,
}

/// Turn optional query dates into a range; both or neither must be given
pub fn optional_range(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> AppResult<Option<DateRange>> {
    match (start_date, end_date) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => DateRange::new(start, end).map(Some).map_err(|msg| {
            AppError::invalid("start_date", msg, "A data inicial deve ser anterior à final")
        }),
        _ => Err(AppError::invalid(
            "start_date/end_date",
            "Both start_date and end_date are required",
            "Informe data inicial e data final",
        )),
    }
}

/// Harvest entry history, newest first
pub async fn get_harvest_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HarvestEntry>>> {
    let range = optional_range(query.start_date, query.end_date)?;
    let service = HarvestService::new(state.db.clone());
    let entries = service.history(range, query.variety.as_deref()).await?;
    Ok(Json(entries))
}
