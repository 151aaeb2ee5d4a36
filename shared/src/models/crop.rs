//! Farmer crop profile models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A crop planted by a farmer, as supplied with each advisory request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropProfile {
    /// Crop identifier, matched case-insensitively (e.g. "wheat")
    pub crop: String,
    pub sowing_date: NaiveDate,
    /// Target yield in maunds per acre
    pub target_yield: Decimal,
    pub soil_type: SoilType,
    pub irrigation_method: IrrigationMethod,
    /// Farm area in acres
    pub area: Decimal,
    /// Date of the last irrigation, when the farmer has recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_irrigation_date: Option<NaiveDate>,
}

impl CropProfile {
    /// Normalized crop key used for knowledge base lookups
    pub fn crop_key(&self) -> String {
        self.crop.trim().to_lowercase()
    }
}

/// Soil texture classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Sandy,
    SandyLoam,
    Loam,
    ClayLoam,
    Clay,
}

impl SoilType {
    pub const ALL: [SoilType; 5] = [
        SoilType::Sandy,
        SoilType::SandyLoam,
        SoilType::Loam,
        SoilType::ClayLoam,
        SoilType::Clay,
    ];
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoilType::Sandy => write!(f, "Sandy"),
            SoilType::SandyLoam => write!(f, "Sandy Loam"),
            SoilType::Loam => write!(f, "Loam"),
            SoilType::ClayLoam => write!(f, "Clay Loam"),
            SoilType::Clay => write!(f, "Clay"),
        }
    }
}

/// How the farm receives water
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationMethod {
    Rainfed,
    TubeWell,
    Canal,
    Drip,
    Sprinkler,
}

impl IrrigationMethod {
    pub const ALL: [IrrigationMethod; 5] = [
        IrrigationMethod::Rainfed,
        IrrigationMethod::TubeWell,
        IrrigationMethod::Canal,
        IrrigationMethod::Drip,
        IrrigationMethod::Sprinkler,
    ];

    /// Whether the farm can apply water on demand
    pub fn has_supply(&self) -> bool {
        !matches!(self, IrrigationMethod::Rainfed)
    }
}

impl std::fmt::Display for IrrigationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrrigationMethod::Rainfed => write!(f, "Rainfed"),
            IrrigationMethod::TubeWell => write!(f, "Tube Well"),
            IrrigationMethod::Canal => write!(f, "Canal"),
            IrrigationMethod::Drip => write!(f, "Drip"),
            IrrigationMethod::Sprinkler => write!(f, "Sprinkler"),
        }
    }
}
