//! Harvest target HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use shared::{HarvestRecord, HarvestTarget, TargetProgress};

use super::harvest::{optional_range, HistoryQuery};
use crate::error::AppResult;
use crate::services::target::{RecordHarvestInput, SetTargetInput, TargetService};
use crate::AppState;

/// List all targets
pub async fn list_targets(State(state): State<AppState>) -> AppResult<Json<Vec<HarvestTarget>>> {
    let service = TargetService::new(state.db.clone(), state.policy().clock);
    let targets = service.list_targets().await?;
    Ok(Json(targets))
}

/// Create or replace a variety's target
pub async fn set_target(
    State(state): State<AppState>,
    Json(input): Json<SetTargetInput>,
) -> AppResult<Json<HarvestTarget>> {
    let service = TargetService::new(state.db.clone(), state.policy().clock);
    let target = service.upsert_target(input).await?;
    Ok(Json(target))
}

/// Delete a variety's target
pub async fn delete_target(
    State(state): State<AppState>,
    Path(variety): Path<String>,
) -> AppResult<StatusCode> {
    let service = TargetService::new(state.db.clone(), state.policy().clock);
    service.delete_target(&variety).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a tallied harvest
pub async fn record_harvest(
    State(state): State<AppState>,
    Json(input): Json<RecordHarvestInput>,
) -> AppResult<(StatusCode, Json<HarvestRecord>)> {
    let service = TargetService::new(state.db.clone(), state.policy().clock);
    let record = service.record_harvest(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List tallied harvests
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HarvestRecord>>> {
    let range = optional_range(query.start_date, query.end_date)?;
    let service = TargetService::new(state.db.clone(), state.policy().clock);
    let records = service.list_records(range).await?;
    Ok(Json(records))
}

/// Progress toward every target
pub async fn get_progress(State(state): State<AppState>) -> AppResult<Json<Vec<TargetProgress>>> {
    let service = TargetService::new(state.db.clone(), state.policy().clock);
    let progress = service.progress().await?;
    Ok(Json(progress))
}
