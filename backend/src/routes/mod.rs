//! Route definitions for Flower Stock Management

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/batches", batch_routes())
        .nest("/harvests", harvest_routes())
        .nest("/targets", target_routes())
        .nest("/reports", report_routes())
}

/// Stock routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::add_batch))
        .route("/import", post(handlers::import_batches))
        .route("/alerts", get(handlers::get_alerts))
        .route("/expired", delete(handlers::remove_expired))
        .route("/:batch_id/withdraw", post(handlers::withdraw))
}

/// Harvest history routes
fn harvest_routes() -> Router<AppState> {
    Router::new().route("/history", get(handlers::get_harvest_history))
}

/// Harvest target routes
fn target_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_targets).put(handlers::set_target))
        .route("/progress", get(handlers::get_progress))
        .route(
            "/records",
            get(handlers::list_records).post(handlers::record_harvest),
        )
        .route("/:variety", delete(handlers::delete_target))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/dashboard", get(handlers::get_dashboard))
}
