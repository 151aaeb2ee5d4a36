//! Knowledge base loading and hot reload

use engine::{KnowledgeBase, SharedKnowledge};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// What the active knowledge base covers
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KnowledgeSummary {
    pub crops: Vec<String>,
    pub currency: String,
}

impl KnowledgeSummary {
    pub fn of(kb: &KnowledgeBase) -> Self {
        Self {
            crops: kb.crop_ids().map(str::to_string).collect(),
            currency: kb.currency.clone(),
        }
    }
}

/// Knowledge service
#[derive(Clone)]
pub struct KnowledgeService {
    knowledge: Arc<SharedKnowledge>,
    path: Option<String>,
}

impl KnowledgeService {
    pub fn new(state: &AppState) -> Self {
        Self {
            knowledge: Arc::clone(&state.knowledge),
            path: state.config.knowledge.path.clone(),
        }
    }

    /// Summary of the snapshot currently served
    pub fn summary(&self) -> KnowledgeSummary {
        KnowledgeSummary::of(&self.knowledge.snapshot())
    }

    /// Re-read the configured knowledge file and swap it in.
    /// Requests already running keep the snapshot they started with.
    pub async fn reload(&self) -> AppResult<KnowledgeSummary> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| AppError::Configuration("no knowledge base file configured".to_string()))?;

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Configuration(format!("cannot read {}: {}", path, e)))?;
        let kb = KnowledgeBase::from_json_str(&json)?;
        let summary = KnowledgeSummary::of(&kb);

        self.knowledge.replace(kb)?;
        tracing::info!(path, crops = ?summary.crops, "Knowledge base reloaded");

        Ok(summary)
    }
}
