//! Fertilizer planning models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::GrowthStageKind;
use crate::types::DasRange;

/// Primary macronutrients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nutrient::Nitrogen => write!(f, "N"),
            Nutrient::Phosphorus => write!(f, "P"),
            Nutrient::Potassium => write!(f, "K"),
        }
    }
}

/// Nutrient masses (kg) or per-nutrient values of any other unit
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutrientAmounts {
    pub nitrogen: Decimal,
    pub phosphorus: Decimal,
    pub potassium: Decimal,
}

impl NutrientAmounts {
    pub fn new(nitrogen: Decimal, phosphorus: Decimal, potassium: Decimal) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> Decimal {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen,
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: Decimal) {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen = value,
            Nutrient::Phosphorus => self.phosphorus = value,
            Nutrient::Potassium => self.potassium = value,
        }
    }

    /// Apply `f` to every nutrient
    pub fn map(&self, f: impl Fn(Nutrient, Decimal) -> Decimal) -> Self {
        let mut out = *self;
        for nutrient in Nutrient::ALL {
            out.set(nutrient, f(nutrient, self.get(nutrient)));
        }
        out
    }
}

/// Where a nutrient multiplier came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierSource {
    Soil,
    Irrigation,
}

/// A multiplier that changed a nutrient target, with its reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppliedMultiplier {
    pub source: MultiplierSource,
    pub nutrient: Nutrient,
    pub factor: Decimal,
    /// Condition that triggered it, e.g. "sandy soil"
    pub reason: String,
}

/// Market fertilizer products
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FertilizerProduct {
    /// Diammonium phosphate
    Dap,
    Urea,
    /// Muriate of potash
    Mop,
}

impl FertilizerProduct {
    pub const ALL: [FertilizerProduct; 3] =
        [FertilizerProduct::Dap, FertilizerProduct::Urea, FertilizerProduct::Mop];
}

impl std::fmt::Display for FertilizerProduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FertilizerProduct::Dap => write!(f, "DAP"),
            FertilizerProduct::Urea => write!(f, "Urea"),
            FertilizerProduct::Mop => write!(f, "MOP"),
        }
    }
}

/// Quantity of one product to buy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductQuantity {
    pub product: FertilizerProduct,
    /// Product mass needed before rounding to bags
    pub mass_kg: Decimal,
    /// Whole bags, rounded up
    pub bags: u32,
    pub cost: Decimal,
}

/// Nutrient targets for the whole farm and the season's product bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutrientPlan {
    pub crop: String,
    pub area_acres: Decimal,
    /// Per-acre targets after the yield adjustment, before multipliers
    pub base_per_acre: NutrientAmounts,
    /// Farm totals (kg) after multipliers
    pub total: NutrientAmounts,
    pub multipliers: Vec<AppliedMultiplier>,
    pub products: Vec<ProductQuantity>,
    pub total_cost: Decimal,
    pub currency: String,
}

/// Time-derived status of a scheduled application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    DueNow,
    Upcoming,
    Missed,
}

impl ApplicationStatus {
    /// Classify from elapsed time alone. No completion signal is considered,
    /// so an application past its window is always `Missed`.
    pub fn classify(das: u32, target_das: u32, tolerance: u32) -> Self {
        let das = i64::from(das);
        let target = i64::from(target_das);
        let tolerance = i64::from(tolerance);
        if (das - target).abs() <= tolerance {
            ApplicationStatus::DueNow
        } else if das > target + tolerance {
            ApplicationStatus::Missed
        } else {
            ApplicationStatus::Upcoming
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::DueNow => write!(f, "DUE_NOW"),
            ApplicationStatus::Upcoming => write!(f, "UPCOMING"),
            ApplicationStatus::Missed => write!(f, "MISSED"),
        }
    }
}

/// Kinds of advice attached to an application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    DueNow,
    SplitDoseSandySoil,
    HeavyRainDelay,
    MissedCritical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisoryTip {
    pub kind: TipKind,
    pub message: String,
}

/// One staged fertilizer application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertilizerApplication {
    /// Application name, e.g. "Sowing" or "Tillering"
    pub name: String,
    /// Stage whose start anchors the target day
    pub anchor_stage: GrowthStageKind,
    /// Percent of each nutrient's season total applied here
    pub fractions: NutrientAmounts,
    /// Nutrient mass (kg) applied here
    pub nutrients: NutrientAmounts,
    pub products: Vec<ProductQuantity>,
    pub cost: Decimal,
    pub target_das: u32,
    /// Days after sowing counted as DUE_NOW
    pub window: DasRange,
    pub target_date: NaiveDate,
    /// Negative once the target day has passed
    pub days_until_target: i64,
    pub critical: bool,
    pub status: ApplicationStatus,
    pub tips: Vec<AdvisoryTip>,
}

/// Season nutrient plan plus the ordered application schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertilizerPlan {
    pub nutrients: NutrientPlan,
    pub applications: Vec<FertilizerApplication>,
}

impl FertilizerPlan {
    /// First application that is due now or still ahead
    pub fn next_application(&self) -> Option<&FertilizerApplication> {
        self.applications
            .iter()
            .find(|app| app.status != ApplicationStatus::Missed)
    }

    pub fn missed(&self) -> impl Iterator<Item = &FertilizerApplication> {
        self.applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::Missed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_window_edges() {
        assert_eq!(ApplicationStatus::classify(0, 0, 3), ApplicationStatus::DueNow);
        assert_eq!(ApplicationStatus::classify(3, 0, 3), ApplicationStatus::DueNow);
        assert_eq!(ApplicationStatus::classify(4, 0, 3), ApplicationStatus::Missed);
        assert_eq!(ApplicationStatus::classify(17, 21, 3), ApplicationStatus::Upcoming);
        assert_eq!(ApplicationStatus::classify(18, 21, 3), ApplicationStatus::DueNow);
        assert_eq!(ApplicationStatus::classify(58, 0, 3), ApplicationStatus::Missed);
    }

    #[test]
    fn test_status_serializes_screaming() {
        let json = serde_json::to_string(&ApplicationStatus::DueNow).unwrap();
        assert_eq!(json, "\"DUE_NOW\"");
        assert_eq!(ApplicationStatus::Missed.to_string(), "MISSED");
    }

    #[test]
    fn test_nutrient_amounts_map() {
        let amounts = NutrientAmounts::new(Decimal::from(10), Decimal::from(20), Decimal::from(30));
        let doubled = amounts.map(|n, v| if n == Nutrient::Nitrogen { v * Decimal::from(2) } else { v });
        assert_eq!(doubled.nitrogen, Decimal::from(20));
        assert_eq!(doubled.phosphorus, Decimal::from(20));
        assert_eq!(doubled.get(Nutrient::Potassium), Decimal::from(30));
    }
}
