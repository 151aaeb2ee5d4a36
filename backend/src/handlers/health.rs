//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::knowledge::{KnowledgeService, KnowledgeSummary};
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub knowledge: KnowledgeSummary,
    pub cached_districts: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        knowledge: KnowledgeService::new(&state).summary(),
        cached_districts: state.weather.cached_districts().await,
    })
}
