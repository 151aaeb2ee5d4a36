//! Advisory facade
//!
//! Resolves the growth stage once and runs the fertilizer, irrigation and
//! risk components against a single knowledge base snapshot.

use chrono::NaiveDate;
use shared::{
    validate_crop_profile, validate_weather_snapshot, AdvisoryResult, CropProfile, RetrievalHit, WeatherSnapshot,
};

use crate::error::{EngineError, EngineResult};
use crate::fertilizer::FertilizerPlanner;
use crate::growth_stage::{days_after_sowing, GrowthStageResolver};
use crate::irrigation::IrrigationPlanner;
use crate::knowledge::KnowledgeBase;
use crate::risk::{RiskAssessor, DEFAULT_PRIORITY_ACTIONS};

/// Behaviour switches for [`Advisor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryOptions {
    /// Produce a fertilizer-only advisory when no weather is available
    /// instead of failing with `Unavailable`
    pub degrade_without_weather: bool,
    pub priority_actions: usize,
}

impl Default for AdvisoryOptions {
    fn default() -> Self {
        Self {
            degrade_without_weather: false,
            priority_actions: DEFAULT_PRIORITY_ACTIONS,
        }
    }
}

/// Runs the complete advisory for one farm
#[derive(Debug, Clone)]
pub struct Advisor<'a> {
    kb: &'a KnowledgeBase,
    options: AdvisoryOptions,
}

impl<'a> Advisor<'a> {
    pub fn new(kb: &'a KnowledgeBase, options: AdvisoryOptions) -> Self {
        Self { kb, options }
    }

    pub fn advise(
        &self,
        profile: &CropProfile,
        as_of: NaiveDate,
        weather: Option<&WeatherSnapshot>,
        retrieval_hits: &[RetrievalHit],
    ) -> EngineResult<AdvisoryResult> {
        validate_crop_profile(profile, as_of)?;
        if let Some(weather) = weather {
            validate_weather_snapshot(weather)?;
        }
        let das = days_after_sowing(profile.sowing_date, as_of)?;
        let stage = GrowthStageResolver::new(self.kb).resolve(&profile.crop, das)?;

        let fertilizer = FertilizerPlanner::new(self.kb);

        let Some(weather) = weather else {
            if !self.options.degrade_without_weather {
                return Err(EngineError::Unavailable("weather snapshot is required".to_string()));
            }
            tracing::warn!(crop = %profile.crop, "No weather available, producing degraded advisory");
            return Ok(AdvisoryResult {
                crop: stage.crop.clone(),
                as_of,
                fertilizer: fertilizer.plan(profile, &stage, None)?,
                stage,
                irrigation: None,
                risk: None,
                priority_actions: Vec::new(),
                degraded: Some(
                    "Weather unavailable: irrigation and risk skipped, fertilizer tips exclude weather".to_string(),
                ),
            });
        };

        let fertilizer = fertilizer.plan(profile, &stage, Some(weather))?;
        let irrigation = IrrigationPlanner::new(self.kb).plan(profile, &stage, weather)?;
        let risk = RiskAssessor::new(self.kb)
            .with_priority_actions(self.options.priority_actions)
            .assess(profile, &stage, weather, retrieval_hits)?;

        tracing::info!(
            crop = %stage.crop,
            stage = %stage.stage,
            das,
            disease_level = %risk.disease_level,
            climate_level = %risk.climate_level,
            "Advisory computed"
        );

        Ok(AdvisoryResult {
            crop: stage.crop.clone(),
            as_of,
            stage,
            fertilizer,
            irrigation: Some(irrigation),
            priority_actions: risk.priority_actions.clone(),
            risk: Some(risk),
            degraded: None,
        })
    }
}
