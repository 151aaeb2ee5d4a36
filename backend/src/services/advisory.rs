//! Advisory service
//!
//! Gathers the engine's external inputs (weather, retrieval hits, the current
//! knowledge base snapshot) and runs the engine components for one request.

use chrono::{DateTime, NaiveDate, Utc};
use engine::{
    days_after_sowing, Advisor, AdvisoryOptions, EngineError, FertilizerPlanner, GrowthStageResolver,
    IrrigationPlanner, KnowledgeBase, RiskAssessor, SharedKnowledge,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_crop_profile, validate_weather_snapshot, AdvisoryResult, CropProfile, FertilizerPlan,
    GrowthStage, IrrigationMethod, IrrigationPlan, RetrievalHit, RiskAssessment, SoilType,
    StageBoundary, WeatherSnapshot,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::{RetrievalProvider, RetrievalQuery};
use crate::services::weather::WeatherService;
use crate::AppState;

const DEGRADED_FERTILIZER: &str = "Weather unavailable: fertilizer tips exclude weather";

/// Farm profile and context for one advisory request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdvisoryRequest {
    #[validate(length(min = 1, max = 50))]
    pub crop: String,
    pub sowing_date: NaiveDate,
    /// Maunds per acre
    pub target_yield: Decimal,
    pub soil_type: SoilType,
    pub irrigation_method: IrrigationMethod,
    /// Acres
    pub area: Decimal,
    #[serde(default)]
    pub last_irrigation_date: Option<NaiveDate>,
    /// District used to fetch weather; optional when `weather` is supplied
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub district: Option<String>,
    /// Evaluation date, defaults to today (UTC)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Caller-supplied weather, bypassing the weather provider
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
}

impl AdvisoryRequest {
    pub fn profile(&self) -> CropProfile {
        CropProfile {
            crop: self.crop.clone(),
            sowing_date: self.sowing_date,
            target_yield: self.target_yield,
            soil_type: self.soil_type,
            irrigation_method: self.irrigation_method,
            area: self.area,
            last_irrigation_date: self.last_irrigation_date,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Combined advisory with a request identifier
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryResponse {
    pub advisory_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AdvisoryResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct FertilizerResponse {
    pub stage: GrowthStage,
    pub plan: FertilizerPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IrrigationResponse {
    pub stage: GrowthStage,
    pub plan: IrrigationPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskResponse {
    pub stage: GrowthStage,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageResponse {
    pub stage: GrowthStage,
    pub lifecycle_end: u32,
    pub stages: Vec<StageBoundary>,
}

/// Inputs resolved for one request against a single knowledge snapshot
struct Prepared {
    kb: Arc<KnowledgeBase>,
    profile: CropProfile,
    as_of: NaiveDate,
    stage: GrowthStage,
    weather: Option<WeatherSnapshot>,
}

/// Advisory service
#[derive(Clone)]
pub struct AdvisoryService {
    knowledge: Arc<SharedKnowledge>,
    weather: WeatherService,
    retrieval: Option<Arc<dyn RetrievalProvider>>,
    options: AdvisoryOptions,
    max_hits: usize,
}

impl AdvisoryService {
    /// Create an AdvisoryService from the shared application state
    pub fn new(state: &AppState) -> Self {
        Self {
            knowledge: Arc::clone(&state.knowledge),
            weather: state.weather.clone(),
            retrieval: state.retrieval.clone(),
            options: AdvisoryOptions {
                degrade_without_weather: state.config.weather.degrade_gracefully,
                priority_actions: state.config.advisory.priority_actions,
            },
            max_hits: state.config.retrieval.max_hits,
        }
    }

    /// Run the complete advisory
    pub async fn advise(&self, request: AdvisoryRequest) -> AppResult<AdvisoryResponse> {
        let prepared = self.prepare(&request).await?;
        let hits = match &prepared.weather {
            Some(weather) => self.retrieval_hits(&request, &prepared.stage, weather).await,
            None => Vec::new(),
        };

        let result = Advisor::new(&prepared.kb, self.options.clone()).advise(
            &prepared.profile,
            prepared.as_of,
            prepared.weather.as_ref(),
            &hits,
        )?;

        Ok(AdvisoryResponse {
            advisory_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            result,
        })
    }

    /// Fertilizer plan only; weather is optional when degrading is enabled
    pub async fn fertilizer(&self, request: AdvisoryRequest) -> AppResult<FertilizerResponse> {
        let prepared = self.prepare(&request).await?;
        let plan = FertilizerPlanner::new(&prepared.kb).plan(
            &prepared.profile,
            &prepared.stage,
            prepared.weather.as_ref(),
        )?;

        Ok(FertilizerResponse {
            degraded: prepared.weather.is_none().then(|| DEGRADED_FERTILIZER.to_string()),
            stage: prepared.stage,
            plan,
        })
    }

    /// Irrigation plan; always needs weather
    pub async fn irrigation(&self, request: AdvisoryRequest) -> AppResult<IrrigationResponse> {
        let prepared = self.prepare(&request).await?;
        let weather = require_weather(prepared.weather.as_ref())?;
        let plan = IrrigationPlanner::new(&prepared.kb).plan(&prepared.profile, &prepared.stage, weather)?;

        Ok(IrrigationResponse {
            stage: prepared.stage,
            plan,
        })
    }

    /// Risk assessment, augmented with retrieval hits when configured
    pub async fn risk(&self, request: AdvisoryRequest) -> AppResult<RiskResponse> {
        let prepared = self.prepare(&request).await?;
        let weather = require_weather(prepared.weather.as_ref())?;
        let hits = self.retrieval_hits(&request, &prepared.stage, weather).await;

        let assessment = RiskAssessor::new(&prepared.kb)
            .with_priority_actions(self.options.priority_actions)
            .assess(&prepared.profile, &prepared.stage, weather, &hits)?;

        Ok(RiskResponse {
            stage: prepared.stage,
            assessment,
        })
    }

    /// Growth stage for a crop on a given day after sowing
    pub fn stage(&self, crop: &str, das: u32) -> AppResult<StageResponse> {
        let kb = self.knowledge.snapshot();
        let resolver = GrowthStageResolver::new(&kb);

        Ok(StageResponse {
            stage: resolver.resolve(crop, das)?,
            lifecycle_end: resolver.lifecycle_end(crop)?,
            stages: resolver.stage_table(crop)?.to_vec(),
        })
    }

    async fn prepare(&self, request: &AdvisoryRequest) -> AppResult<Prepared> {
        request.validate()?;

        let profile = request.profile();
        let as_of = request.as_of();
        validate_crop_profile(&profile, as_of).map_err(EngineError::from)?;

        let kb = self.knowledge.snapshot();
        let das = days_after_sowing(profile.sowing_date, as_of)?;
        let stage = GrowthStageResolver::new(&kb).resolve(&profile.crop, das)?;

        let weather = self.weather_for(request).await?;

        Ok(Prepared {
            kb,
            profile,
            as_of,
            stage,
            weather,
        })
    }

    async fn weather_for(&self, request: &AdvisoryRequest) -> AppResult<Option<WeatherSnapshot>> {
        if let Some(weather) = &request.weather {
            validate_weather_snapshot(weather).map_err(EngineError::from)?;
            return Ok(Some(weather.clone()));
        }

        let district = request.district.as_deref().ok_or_else(|| AppError::Validation {
            field: "district".to_string(),
            message: "district is required when no weather snapshot is supplied".to_string(),
            message_ur: "موسم کی معلومات کے لیے ضلع درج کریں".to_string(),
        })?;

        match self.weather.snapshot_for_district(district).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(AppError::WeatherUnavailable(reason)) if self.options.degrade_without_weather => {
                tracing::warn!(district, %reason, "Weather unavailable, continuing in degraded mode");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn retrieval_hits(
        &self,
        request: &AdvisoryRequest,
        stage: &GrowthStage,
        weather: &WeatherSnapshot,
    ) -> Vec<RetrievalHit> {
        let Some(provider) = &self.retrieval else {
            return Vec::new();
        };

        let query = RetrievalQuery {
            crop: stage.crop.clone(),
            stage: stage.stage,
            days_after_sowing: stage.days_after_sowing,
            district: request.district.clone(),
            temperature_celsius: weather.current.temperature_celsius,
            humidity_percent: weather.current.humidity_percent,
            max_hits: self.max_hits,
        };

        match provider.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed, assessing risk from rules only");
                Vec::new()
            }
        }
    }
}

fn require_weather(weather: Option<&WeatherSnapshot>) -> AppResult<&WeatherSnapshot> {
    weather.ok_or_else(|| EngineError::Unavailable("weather snapshot is required".to_string()).into())
}
