//! HTTP handlers for knowledge base management

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::knowledge::{KnowledgeService, KnowledgeSummary};
use crate::AppState;

pub async fn get_knowledge_summary(State(state): State<AppState>) -> Json<KnowledgeSummary> {
    Json(KnowledgeService::new(&state).summary())
}

/// Reload the knowledge base from the configured file
pub async fn reload_knowledge(State(state): State<AppState>) -> AppResult<Json<KnowledgeSummary>> {
    let service = KnowledgeService::new(&state);
    Ok(Json(service.reload().await?))
}
