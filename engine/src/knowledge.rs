//! Static agronomic reference data
//!
//! The knowledge base holds every table the engine reads: crop stage
//! tables, nutrient baselines and splits, stage water baselines, risk rules,
//! soil and irrigation multipliers, soil water-holding profiles and market
//! product constants. It is immutable once built; hot reload swaps the whole
//! snapshot through [`SharedKnowledge`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_split_fractions, validate_stage_partition, DasRange, FertilizerProduct,
    GrowthStageKind, IrrigationMethod, Nutrient, NutrientAmounts, RiskCategory, RiskLevel,
    SoilType, StageBoundary,
};

use crate::error::{EngineError, EngineResult};

/// Complete reference data set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBase {
    /// Crops keyed by lowercase identifier
    pub crops: BTreeMap<String, CropKnowledge>,
    /// Per-nutrient factor for each soil type
    pub soil_nutrient_multipliers: BTreeMap<SoilType, NutrientAmounts>,
    /// Per-nutrient factor for each irrigation method
    pub irrigation_nutrient_multipliers: BTreeMap<IrrigationMethod, NutrientAmounts>,
    pub soil_water: BTreeMap<SoilType, SoilWaterProfile>,
    pub products: BTreeMap<FertilizerProduct, ProductSpec>,
    pub currency: String,
    pub fertilizer: FertilizerConstants,
    pub water: WaterConstants,
    pub risk_scoring: RiskScoring,
}

/// Everything known about one crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropKnowledge {
    /// Display name, e.g. "Wheat"
    pub name: String,
    /// Contiguous stage partition starting at day 0
    pub stages: Vec<StageBoundary>,
    pub nutrients: NutrientBaseline,
    /// Ordered application schedule
    pub splits: Vec<SplitRule>,
    /// Baseline water requirement (mm/day) per stage
    pub stage_water_mm: BTreeMap<GrowthStageKind, Decimal>,
    pub risks: Vec<RiskRule>,
}

impl CropKnowledge {
    /// Last day of the final stage
    pub fn lifecycle_end(&self) -> u32 {
        self.stages.last().map(|s| s.days.end).unwrap_or(0)
    }

    pub fn stage(&self, kind: GrowthStageKind) -> Option<&StageBoundary> {
        self.stages.iter().find(|s| s.stage == kind)
    }

    pub fn risk(&self, id: &str) -> Option<&RiskRule> {
        self.risks.iter().find(|r| r.id == id)
    }

    /// Water baseline for a stage
    pub fn water_baseline(&self, kind: GrowthStageKind) -> EngineResult<Decimal> {
        self.stage_water_mm.get(&kind).copied().ok_or_else(|| {
            EngineError::DataIntegrity(format!("{}: no water baseline for stage {}", self.name, kind))
        })
    }
}

/// Nutrient requirement per acre at the baseline yield
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutrientBaseline {
    /// Yield (maunds/acre) the per-acre targets are calibrated for
    pub baseline_yield: Decimal,
    /// kg per acre
    pub per_acre: NutrientAmounts,
    /// Yield increment (maunds) that earns one nitrogen step
    pub yield_step: Decimal,
    /// Extra nitrogen (kg/acre) per yield step
    pub nitrogen_per_step: Decimal,
}

/// One staged application in a crop's schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitRule {
    pub name: String,
    /// Stage whose first day anchors the target
    pub anchor_stage: GrowthStageKind,
    /// Days after the anchor stage begins
    pub offset_days: u32,
    /// Percent of each nutrient's season total
    pub fractions: NutrientAmounts,
    /// Missing this application warrants escalation
    pub critical: bool,
}

/// Inclusive bounds; an absent bound is always satisfied. A threshold with
/// neither bound is undeclared and takes no part in scoring.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Threshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
}

impl Threshold {
    pub fn at_least(min: Decimal) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: Decimal) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: Decimal, max: Decimal) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether the rule constrains this condition at all
    pub fn is_declared(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn is_satisfied_by(&self, value: Decimal) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Disease or climate risk condition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskRule {
    pub id: String,
    pub name: String,
    pub category: RiskCategory,
    pub severity: RiskLevel,
    /// Stages in which the risk applies
    pub stages: Vec<GrowthStageKind>,
    pub days: DasRange,
    #[serde(default)]
    pub temperature: Threshold,
    #[serde(default)]
    pub humidity: Threshold,
    /// Recommended treatment or action
    pub action: String,
}

/// Field capacity and wilting point (mm of water in the root zone)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoilWaterProfile {
    pub field_capacity_mm: Decimal,
    pub wilting_point_mm: Decimal,
}

impl SoilWaterProfile {
    /// Total available water between field capacity and wilting point
    pub fn available_water_mm(&self) -> Decimal {
        self.field_capacity_mm - self.wilting_point_mm
    }
}

/// A market fertilizer product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSpec {
    /// Nutrient fraction by mass (0.46 = 46%)
    pub content: NutrientAmounts,
    pub bag_kg: Decimal,
    pub bag_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilizerConstants {
    /// Days either side of the target counted as DUE_NOW
    pub tolerance_days: u32,
    /// Forecast rain over an application window that triggers a delay tip
    pub heavy_rain_mm: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterConstants {
    pub reference_temperature_celsius: Decimal,
    pub mm_per_degree_above: Decimal,
    pub reference_humidity_percent: Decimal,
    pub humidity_step_percent: Decimal,
    pub mm_per_humidity_step: Decimal,
    pub trailing_rainfall_days: u32,
    /// Liters produced by 1 mm of water over one unit of farm area (acre)
    pub liters_per_mm_per_area_unit: Decimal,
    /// Depletion share of available water that raises a low-moisture warning
    pub low_moisture_ratio: Decimal,
    /// Depletion share of available water that is critical
    pub critical_depletion_ratio: Decimal,
    /// Forecast rain over the next days that lets irrigation wait
    pub heavy_rain_skip_mm: Decimal,
    pub heavy_rain_lookahead_days: u32,
    /// Above this peak temperature irrigate early morning or evening
    pub hot_day_celsius: Decimal,
    /// Above this peak temperature irrigate in the morning
    pub warm_day_celsius: Decimal,
}

/// Weights of the four condition classes and the keep threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskScoring {
    pub stage_weight: Decimal,
    pub das_weight: Decimal,
    pub temperature_weight: Decimal,
    pub humidity_weight: Decimal,
    /// Findings scoring below this are discarded; equal is kept
    pub min_score: Decimal,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        crate::builtin::knowledge_base()
    }
}

impl KnowledgeBase {
    /// Built-in wheat and maize tables
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Parse and validate a knowledge base from JSON
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let parsed: KnowledgeBase = serde_json::from_str(json)
            .map_err(|e| EngineError::DataIntegrity(format!("malformed knowledge base: {}", e)))?;
        let kb = parsed.normalized();
        kb.validate()?;
        Ok(kb)
    }

    /// Read, parse and validate a knowledge base file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EngineError::DataIntegrity(format!("cannot read {}: {}", path.display(), e))
        })?;
        let kb = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), crops = kb.crops.len(), "Knowledge base loaded");
        Ok(kb)
    }

    pub fn to_json_string(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::DataIntegrity(format!("cannot serialize knowledge base: {}", e)))
    }

    /// Crop tables for an identifier, matched case-insensitively
    pub fn crop(&self, crop: &str) -> EngineResult<&CropKnowledge> {
        self.crops
            .get(&crop.trim().to_lowercase())
            .ok_or_else(|| EngineError::UnknownCrop(crop.to_string()))
    }

    pub fn crop_ids(&self) -> impl Iterator<Item = &str> {
        self.crops.keys().map(String::as_str)
    }

    pub fn product(&self, product: FertilizerProduct) -> EngineResult<&ProductSpec> {
        self.products
            .get(&product)
            .ok_or_else(|| EngineError::DataIntegrity(format!("missing product {}", product)))
    }

    pub fn soil_multiplier(&self, soil: SoilType) -> EngineResult<&NutrientAmounts> {
        self.soil_nutrient_multipliers
            .get(&soil)
            .ok_or_else(|| EngineError::DataIntegrity(format!("no nutrient multiplier for {} soil", soil)))
    }

    pub fn irrigation_multiplier(&self, method: IrrigationMethod) -> EngineResult<&NutrientAmounts> {
        self.irrigation_nutrient_multipliers.get(&method).ok_or_else(|| {
            EngineError::DataIntegrity(format!("no nutrient multiplier for {} irrigation", method))
        })
    }

    pub fn soil_water(&self, soil: SoilType) -> EngineResult<&SoilWaterProfile> {
        self.soil_water
            .get(&soil)
            .ok_or_else(|| EngineError::DataIntegrity(format!("no water profile for {} soil", soil)))
    }

    fn normalized(mut self) -> Self {
        self.crops = self
            .crops
            .into_iter()
            .map(|(key, crop)| (key.trim().to_lowercase(), crop))
            .collect();
        self
    }

    /// Check every structural invariant the planners rely on
    pub fn validate(&self) -> EngineResult<()> {
        if self.crops.is_empty() {
            return Err(integrity("knowledge base defines no crops"));
        }
        for (key, crop) in &self.crops {
            validate_crop(key, crop)?;
        }

        for soil in SoilType::ALL {
            self.soil_multiplier(soil)?;
            let water = self.soil_water(soil)?;
            if water.available_water_mm() <= Decimal::ZERO {
                return Err(integrity(format!(
                    "{} soil: field capacity must exceed wilting point",
                    soil
                )));
            }
        }
        for method in IrrigationMethod::ALL {
            self.irrigation_multiplier(method)?;
        }
        let all_multipliers = self
            .soil_nutrient_multipliers
            .values()
            .chain(self.irrigation_nutrient_multipliers.values());
        for factors in all_multipliers {
            if Nutrient::ALL.iter().any(|n| factors.get(*n) <= Decimal::ZERO) {
                return Err(integrity("nutrient multipliers must be positive"));
            }
        }

        for product in FertilizerProduct::ALL {
            let spec = self.product(product)?;
            if spec.bag_kg <= Decimal::ZERO || spec.bag_price < Decimal::ZERO {
                return Err(integrity(format!("{}: bag mass and price must be positive", product)));
            }
        }
        let carries = |product: FertilizerProduct, nutrient: Nutrient| {
            self.products
                .get(&product)
                .map_or(false, |spec| spec.content.get(nutrient) > Decimal::ZERO)
        };
        if !carries(FertilizerProduct::Dap, Nutrient::Phosphorus)
            || !carries(FertilizerProduct::Urea, Nutrient::Nitrogen)
            || !carries(FertilizerProduct::Mop, Nutrient::Potassium)
        {
            return Err(integrity(
                "DAP must carry phosphate, Urea nitrogen and MOP potash",
            ));
        }

        if self.water.liters_per_mm_per_area_unit <= Decimal::ZERO
            || self.water.humidity_step_percent <= Decimal::ZERO
        {
            return Err(integrity("water conversion constants must be positive"));
        }
        if self.water.low_moisture_ratio <= Decimal::ZERO
            || self.water.critical_depletion_ratio < Decimal::ONE
        {
            return Err(integrity("moisture ratios out of range"));
        }

        let scoring = &self.risk_scoring;
        let weights = [
            scoring.stage_weight,
            scoring.das_weight,
            scoring.temperature_weight,
            scoring.humidity_weight,
        ];
        if weights.iter().any(|w| *w <= Decimal::ZERO) {
            return Err(integrity("risk scoring weights must be positive"));
        }
        if scoring.min_score < Decimal::ZERO || scoring.min_score > Decimal::ONE_HUNDRED {
            return Err(integrity("risk minimum score must lie in [0, 100]"));
        }
        Ok(())
    }
}

fn integrity(message: impl Into<String>) -> EngineError {
    EngineError::DataIntegrity(message.into())
}

fn validate_crop(key: &str, crop: &CropKnowledge) -> EngineResult<()> {
    validate_stage_partition(&crop.stages)
        .map_err(|e| integrity(format!("{}: {}", key, e)))?;

    for stage in &crop.stages {
        crop.water_baseline(stage.stage)?;
    }

    let baseline = &crop.nutrients;
    if baseline.yield_step <= Decimal::ZERO || baseline.baseline_yield <= Decimal::ZERO {
        return Err(integrity(format!("{}: yield baseline and step must be positive", key)));
    }
    if Nutrient::ALL
        .iter()
        .any(|n| baseline.per_acre.get(*n) < Decimal::ZERO)
    {
        return Err(integrity(format!("{}: nutrient baselines cannot be negative", key)));
    }

    if crop.splits.is_empty() {
        return Err(integrity(format!("{}: no fertilizer splits", key)));
    }
    for nutrient in Nutrient::ALL {
        let fractions: Vec<Decimal> = crop.splits.iter().map(|s| s.fractions.get(nutrient)).collect();
        validate_split_fractions(&fractions)
            .map_err(|e| integrity(format!("{}: {} {}", key, nutrient, e)))?;
    }
    for split in &crop.splits {
        if crop.stage(split.anchor_stage).is_none() {
            return Err(integrity(format!(
                "{}: split {} anchored to unknown stage {}",
                key, split.name, split.anchor_stage
            )));
        }
    }

    for rule in &crop.risks {
        if rule.days.is_empty() {
            return Err(integrity(format!("{}: risk {} has an inverted day range", key, rule.id)));
        }
        if !rule.temperature.is_declared() && !rule.humidity.is_declared() {
            return Err(integrity(format!("{}: risk {} declares no weather condition", key, rule.id)));
        }
        if rule.stages.is_empty() {
            return Err(integrity(format!("{}: risk {} names no stages", key, rule.id)));
        }
        if crop.risks.iter().filter(|r| r.id == rule.id).count() > 1 {
            return Err(integrity(format!("{}: duplicate risk id {}", key, rule.id)));
        }
    }
    Ok(())
}

/// Atomically swappable knowledge base handle.
///
/// Readers take an `Arc` snapshot and keep a single consistent version for
/// the whole computation; a reload replaces the snapshot wholesale.
#[derive(Debug)]
pub struct SharedKnowledge {
    current: RwLock<Arc<KnowledgeBase>>,
}

impl SharedKnowledge {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            current: RwLock::new(Arc::new(kb)),
        }
    }

    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Validate `kb` and make it the current snapshot
    pub fn replace(&self, kb: KnowledgeBase) -> EngineResult<()> {
        kb.validate()?;
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(kb);
        tracing::info!("Knowledge base snapshot replaced");
        Ok(())
    }
}

impl Default for SharedKnowledge {
    fn default() -> Self {
        Self::new(KnowledgeBase::builtin())
    }
}
