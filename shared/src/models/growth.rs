//! Crop growth stage models

use serde::{Deserialize, Serialize};

use crate::types::DasRange;

/// Physiological growth stages across the supported crops
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStageKind {
    Germination,
    Tillering,
    Vegetative,
    Jointing,
    Booting,
    Tasseling,
    Flowering,
    GrainFilling,
    Maturity,
}

impl std::fmt::Display for GrowthStageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthStageKind::Germination => write!(f, "Germination"),
            GrowthStageKind::Tillering => write!(f, "Tillering"),
            GrowthStageKind::Vegetative => write!(f, "Vegetative"),
            GrowthStageKind::Jointing => write!(f, "Jointing"),
            GrowthStageKind::Booting => write!(f, "Booting"),
            GrowthStageKind::Tasseling => write!(f, "Tasseling"),
            GrowthStageKind::Flowering => write!(f, "Flowering"),
            GrowthStageKind::GrainFilling => write!(f, "Grain Filling"),
            GrowthStageKind::Maturity => write!(f, "Maturity"),
        }
    }
}

/// One row of a crop's stage table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageBoundary {
    pub stage: GrowthStageKind,
    pub days: DasRange,
}

/// The stage a crop is in on a given day. Derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrowthStage {
    pub crop: String,
    pub stage: GrowthStageKind,
    pub days: DasRange,
    pub days_after_sowing: u32,
    /// Days since the stage began (0 on its first day)
    pub day_offset: u32,
}

impl GrowthStage {
    /// Days left in the current stage, excluding today
    pub fn days_remaining(&self) -> u32 {
        self.days.len().saturating_sub(self.day_offset + 1)
    }
}
