//! Irrigation planning models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::GrowthStageKind;

/// Status of an irrigation event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationStatus {
    Scheduled,
    Overdue,
    WarningCritical,
}

impl std::fmt::Display for IrrigationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrrigationStatus::Scheduled => write!(f, "Scheduled"),
            IrrigationStatus::Overdue => write!(f, "Overdue"),
            IrrigationStatus::WarningCritical => write!(f, "Warning-Critical"),
        }
    }
}

/// Time of day to irrigate, chosen by the day's maximum temperature
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationTiming {
    EarlyMorningOrEvening,
    Morning,
    LateMorning,
}

impl std::fmt::Display for IrrigationTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrrigationTiming::EarlyMorningOrEvening => write!(f, "Early morning (5-7 AM) or evening"),
            IrrigationTiming::Morning => write!(f, "Morning (6-9 AM)"),
            IrrigationTiming::LateMorning => write!(f, "Late morning (8-11 AM)"),
        }
    }
}

/// How today's water requirement was derived (all values mm/day)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaterRequirement {
    pub stage: GrowthStageKind,
    pub baseline_mm: Decimal,
    pub temperature_adjustment_mm: Decimal,
    pub humidity_adjustment_mm: Decimal,
    /// Requirement after weather adjustments, floored at zero
    pub gross_mm: Decimal,
    pub trailing_rainfall_mm: Decimal,
    /// Gross requirement less trailing rainfall, floored at zero
    pub net_mm: Decimal,
}

/// Soil moisture deficit at evaluation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoistureState {
    /// Field capacity minus wilting point for the soil
    pub available_water_mm: Decimal,
    pub depletion_mm: Decimal,
    pub depletion_percent: Decimal,
    /// Days counted into the depletion estimate
    pub days_since_irrigation: u32,
}

/// One irrigation to perform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IrrigationEvent {
    pub date: NaiveDate,
    pub days_after_sowing: u32,
    pub stage: GrowthStageKind,
    pub depth_mm: Decimal,
    pub volume_liters: Decimal,
    pub status: IrrigationStatus,
    pub timing: IrrigationTiming,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationWarningKind {
    CriticalMoisture,
    LowMoisture,
    HeavyRainExpected,
    RainfedSupply,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IrrigationWarning {
    pub kind: IrrigationWarningKind,
    pub message: String,
}

/// Requirement, moisture state and ordered irrigation events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IrrigationPlan {
    pub requirement: WaterRequirement,
    pub moisture: MoistureState,
    pub events: Vec<IrrigationEvent>,
    pub warnings: Vec<IrrigationWarning>,
}

impl IrrigationPlan {
    pub fn next_irrigation(&self) -> Option<NaiveDate> {
        self.events.first().map(|event| event.date)
    }

    pub fn has_warning(&self, kind: IrrigationWarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}
