//! HTTP handlers for advisory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::advisory::{
    AdvisoryRequest, AdvisoryResponse, AdvisoryService, FertilizerResponse, IrrigationResponse,
    RiskResponse, StageResponse,
};
use crate::AppState;

/// Complete advisory: fertilizer, irrigation and risk
pub async fn create_advisory(
    State(state): State<AppState>,
    Json(input): Json<AdvisoryRequest>,
) -> AppResult<Json<AdvisoryResponse>> {
    let service = AdvisoryService::new(&state);
    Ok(Json(service.advise(input).await?))
}

pub async fn plan_fertilizer(
    State(state): State<AppState>,
    Json(input): Json<AdvisoryRequest>,
) -> AppResult<Json<FertilizerResponse>> {
    let service = AdvisoryService::new(&state);
    Ok(Json(service.fertilizer(input).await?))
}

pub async fn plan_irrigation(
    State(state): State<AppState>,
    Json(input): Json<AdvisoryRequest>,
) -> AppResult<Json<IrrigationResponse>> {
    let service = AdvisoryService::new(&state);
    Ok(Json(service.irrigation(input).await?))
}

pub async fn assess_risk(
    State(state): State<AppState>,
    Json(input): Json<AdvisoryRequest>,
) -> AppResult<Json<RiskResponse>> {
    let service = AdvisoryService::new(&state);
    Ok(Json(service.risk(input).await?))
}

/// Query parameters for stage lookup
#[derive(Debug, Deserialize)]
pub struct StageQuery {
    pub das: u32,
}

/// Growth stage of a crop on a day after sowing
pub async fn get_crop_stage(
    State(state): State<AppState>,
    Path(crop): Path<String>,
    Query(query): Query<StageQuery>,
) -> AppResult<Json<StageResponse>> {
    let service = AdvisoryService::new(&state);
    Ok(Json(service.stage(&crop, query.das)?))
}
