//! Semantic retrieval client
//!
//! Queries an external vector search service for knowledge snippets
//! relevant to the farm's current situation. Only the risk identifier and
//! relevance of each hit are used by the risk assessment.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{GrowthStageKind, RetrievalHit};
use std::time::Duration;
use thiserror::Error;

use crate::error::{AppError, AppResult};

/// Failure reaching the search service. The risk assessment falls back to
/// rules, so these never become HTTP errors.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Retrieval request failed: {0}")]
    Request(String),

    #[error("Retrieval service returned status {0}")]
    Status(u16),

    #[error("Failed to parse retrieval response: {0}")]
    Response(String),
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Context sent to the search service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalQuery {
    pub crop: String,
    pub stage: GrowthStageKind,
    pub days_after_sowing: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub temperature_celsius: Decimal,
    pub humidity_percent: Decimal,
    pub max_hits: usize,
}

/// Source of retrieval hits
#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    async fn search(&self, query: &RetrievalQuery) -> RetrievalResult<Vec<RetrievalHit>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<RetrievalHit>,
}

/// HTTP retrieval client posting the query as JSON
#[derive(Clone)]
pub struct HttpRetrievalClient {
    client: Client,
    endpoint: String,
}

impl HttpRetrievalClient {
    pub fn new(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build retrieval client: {}", e)))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl RetrievalProvider for HttpRetrievalClient {
    async fn search(&self, query: &RetrievalQuery) -> RetrievalResult<Vec<RetrievalHit>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(query)
            .send()
            .await
            .map_err(|e| RetrievalError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RetrievalError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Response(e.to_string()))?;

        let mut hits = body.hits;
        hits.truncate(query.max_hits);
        Ok(hits)
    }
}
