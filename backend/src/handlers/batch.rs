//! Batch (stock) HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::{BatchView, LegacyStockItem};

use crate::error::AppResult;
use crate::services::batch::{
    AddBatchInput, BatchFilter, BatchService, ExpiredRemoval, ImportSummary, StockListing,
    WithdrawInput, WithdrawalResult,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// "current" for the week containing today
    pub week: Option<String>,
}

/// List stock with status, alerts and total quantity
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchListQuery>,
) -> AppResult<Json<StockListing>> {
    let filter = BatchFilter::from_query(query.start_date, query.end_date, query.week.as_deref())?;
    let service = BatchService::new(state.db.clone(), state.policy());
    let listing = service.list(filter).await?;
    Ok(Json(listing))
}

/// Add a batch to stock
pub async fn add_batch(
    State(state): State<AppState>,
    Json(input): Json<AddBatchInput>,
) -> AppResult<(StatusCode, Json<BatchView>)> {
    let service = BatchService::new(state.db.clone(), state.policy());
    let batch = service.add_batch(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Bulk-load a legacy JSON stock file
pub async fn import_batches(
    State(state): State<AppState>,
    Json(items): Json<Vec<LegacyStockItem>>,
) -> AppResult<Json<ImportSummary>> {
    let service = BatchService::new(state.db.clone(), state.policy());
    let summary = service.import_legacy(items).await?;
    Ok(Json(summary))
}

/// Batches close to expiry
pub async fn get_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<BatchView>>> {
    let service = BatchService::new(state.db.clone(), state.policy());
    let alerts = service.alerts().await?;
    Ok(Json(alerts))
}

/// Withdraw stems from a batch
pub async fn withdraw(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<WithdrawInput>,
) -> AppResult<Json<WithdrawalResult>> {
    let service = BatchService::new(state.db.clone(), state.policy());
    let result = service.withdraw(batch_id, input).await?;
    Ok(Json(result))
}

/// Delete expired batches
pub async fn remove_expired(State(state): State<AppState>) -> AppResult<Json<ExpiredRemoval>> {
    let service = BatchService::new(state.db.clone(), state.policy());
    let removal = service.remove_expired().await?;
    Ok(Json(removal))
}
