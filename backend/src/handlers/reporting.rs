//! Reporting handlers for the stock report, dashboard and export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::Dashboard;

use super::harvest::optional_range;
use crate::error::AppResult;
use crate::services::reporting::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

/// Get the stock report
pub async fn get_stock_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let range = optional_range(query.start_date, query.end_date)?;
    let service = ReportingService::new(state.db.clone(), state.policy());
    let report = service.stock_report(range).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&report.lines())?;
        Ok((
            [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"stock_report.csv\"")],
            csv,
        ).into_response())
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get dashboard totals
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    let service = ReportingService::new(state.db.clone(), state.policy());
    let dashboard = service.dashboard().await?;
    Ok(Json(dashboard))
}
