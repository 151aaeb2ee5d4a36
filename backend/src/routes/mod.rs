//! Route definitions for the advisory server

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/advisory", advisory_routes())
        .route("/crops/:crop/stage", get(handlers::get_crop_stage))
        .nest("/knowledge", knowledge_routes())
}

/// Advisory routes
fn advisory_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_advisory))
        .route("/fertilizer", post(handlers::plan_fertilizer))
        .route("/irrigation", post(handlers::plan_irrigation))
        .route("/risk", post(handlers::assess_risk))
}

/// Knowledge base routes
fn knowledge_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_knowledge_summary))
        .route("/reload", post(handlers::reload_knowledge))
}
