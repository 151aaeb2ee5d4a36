//! Combined advisory result

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FertilizerPlan, GrowthStage, IrrigationPlan, PriorityAction, RiskAssessment};

/// Everything the engine says about one farm on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisoryResult {
    pub crop: String,
    pub as_of: NaiveDate,
    pub stage: GrowthStage,
    pub fertilizer: FertilizerPlan,
    /// Absent only in degraded mode
    pub irrigation: Option<IrrigationPlan>,
    /// Absent only in degraded mode
    pub risk: Option<RiskAssessment>,
    pub priority_actions: Vec<PriorityAction>,
    /// Why weather-dependent parts were skipped, when they were
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl AdvisoryResult {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}
