//! Built-in reference tables for wheat and maize in Pakistan
//!
//! Masses are kg per acre, yields maunds per acre, water mm, prices PKR.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::{
    DasRange, FertilizerProduct, GrowthStageKind, IrrigationMethod, NutrientAmounts, RiskCategory,
    RiskLevel, SoilType, StageBoundary,
};

use crate::knowledge::{
    CropKnowledge, FertilizerConstants, KnowledgeBase, NutrientBaseline, ProductSpec, RiskRule,
    RiskScoring, SoilWaterProfile, SplitRule, Threshold, WaterConstants,
};

use GrowthStageKind::*;

fn dec(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

fn int(value: i64) -> Decimal {
    Decimal::from(value)
}

fn npk(n: Decimal, p: Decimal, k: Decimal) -> NutrientAmounts {
    NutrientAmounts::new(n, p, k)
}

fn identity() -> NutrientAmounts {
    npk(Decimal::ONE, Decimal::ONE, Decimal::ONE)
}

fn stages(table: &[(GrowthStageKind, u32, u32)]) -> Vec<StageBoundary> {
    table
        .iter()
        .map(|(stage, start, end)| StageBoundary {
            stage: *stage,
            days: DasRange::new(*start, *end),
        })
        .collect()
}

fn split(
    name: &str,
    anchor_stage: GrowthStageKind,
    offset_days: u32,
    fractions: (i64, i64, i64),
    critical: bool,
) -> SplitRule {
    SplitRule {
        name: name.to_string(),
        anchor_stage,
        offset_days,
        fractions: npk(int(fractions.0), int(fractions.1), int(fractions.2)),
        critical,
    }
}

struct Rule<'a> {
    id: &'a str,
    name: &'a str,
    category: RiskCategory,
    severity: RiskLevel,
    stages: &'a [GrowthStageKind],
    days: (u32, u32),
    temperature: Threshold,
    humidity: Threshold,
    action: &'a str,
}

impl Rule<'_> {
    fn build(self) -> RiskRule {
        RiskRule {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            severity: self.severity,
            stages: self.stages.to_vec(),
            days: DasRange::new(self.days.0, self.days.1),
            temperature: self.temperature,
            humidity: self.humidity,
            action: self.action.to_string(),
        }
    }
}

pub(crate) fn knowledge_base() -> KnowledgeBase {
    let mut crops = BTreeMap::new();
    crops.insert("wheat".to_string(), wheat());
    crops.insert("maize".to_string(), maize());

    let mut soil_nutrient_multipliers = BTreeMap::new();
    for soil in SoilType::ALL {
        soil_nutrient_multipliers.insert(soil, identity());
    }
    // Sandy soils leach nitrogen; clay fixes phosphate
    soil_nutrient_multipliers.insert(SoilType::Sandy, npk(dec(120, 2), Decimal::ONE, Decimal::ONE));
    soil_nutrient_multipliers.insert(SoilType::Clay, npk(Decimal::ONE, dec(115, 2), Decimal::ONE));

    let mut irrigation_nutrient_multipliers = BTreeMap::new();
    for method in IrrigationMethod::ALL {
        irrigation_nutrient_multipliers.insert(method, identity());
    }
    irrigation_nutrient_multipliers.insert(
        IrrigationMethod::Rainfed,
        npk(dec(90, 2), dec(90, 2), dec(90, 2)),
    );

    let soil_water = [
        (SoilType::Sandy, 60, 25),
        (SoilType::SandyLoam, 75, 30),
        (SoilType::Loam, 90, 35),
        (SoilType::ClayLoam, 100, 40),
        (SoilType::Clay, 110, 45),
    ]
    .into_iter()
    .map(|(soil, fc, wp)| {
        (
            soil,
            SoilWaterProfile {
                field_capacity_mm: int(fc),
                wilting_point_mm: int(wp),
            },
        )
    })
    .collect();

    let mut products = BTreeMap::new();
    products.insert(
        FertilizerProduct::Dap,
        ProductSpec {
            content: npk(dec(18, 2), dec(46, 2), Decimal::ZERO),
            bag_kg: int(50),
            bag_price: int(12_000),
        },
    );
    products.insert(
        FertilizerProduct::Urea,
        ProductSpec {
            content: npk(dec(46, 2), Decimal::ZERO, Decimal::ZERO),
            bag_kg: int(50),
            bag_price: int(4_500),
        },
    );
    products.insert(
        FertilizerProduct::Mop,
        ProductSpec {
            content: npk(Decimal::ZERO, Decimal::ZERO, dec(60, 2)),
            bag_kg: int(50),
            bag_price: int(9_000),
        },
    );

    KnowledgeBase {
        crops,
        soil_nutrient_multipliers,
        irrigation_nutrient_multipliers,
        soil_water,
        products,
        currency: "PKR".to_string(),
        fertilizer: FertilizerConstants {
            tolerance_days: 3,
            heavy_rain_mm: int(30),
        },
        water: WaterConstants {
            reference_temperature_celsius: int(25),
            mm_per_degree_above: dec(5, 1),
            reference_humidity_percent: int(60),
            humidity_step_percent: int(10),
            mm_per_humidity_step: dec(3, 1),
            trailing_rainfall_days: 3,
            // 1 mm over one acre (4046.86 m2)
            liters_per_mm_per_area_unit: dec(404_686, 2),
            low_moisture_ratio: dec(75, 2),
            critical_depletion_ratio: dec(125, 2),
            heavy_rain_skip_mm: int(8),
            heavy_rain_lookahead_days: 3,
            hot_day_celsius: int(32),
            warm_day_celsius: int(28),
        },
        risk_scoring: RiskScoring {
            stage_weight: int(20),
            das_weight: int(20),
            temperature_weight: int(30),
            humidity_weight: int(30),
            min_score: int(65),
        },
    }
}

fn wheat() -> CropKnowledge {
    let stage_water_mm = [
        (Germination, dec(20, 1)),
        (Tillering, dec(30, 1)),
        (Jointing, dec(40, 1)),
        (Booting, dec(45, 1)),
        (Flowering, dec(50, 1)),
        (GrainFilling, dec(35, 1)),
    ]
    .into_iter()
    .collect();

    let risks = vec![
        Rule {
            id: "seedling_blight",
            name: "Seedling Fungal Blight",
            category: RiskCategory::Disease,
            severity: RiskLevel::Medium,
            stages: &[Germination],
            days: (0, 14),
            temperature: Threshold::default(),
            humidity: Threshold::at_least(int(80)),
            action: "Use treated seed and keep field drainage clear",
        },
        Rule {
            id: "yellow_rust",
            name: "Yellow Rust",
            category: RiskCategory::Disease,
            severity: RiskLevel::High,
            stages: &[Tillering, Jointing, Booting, Flowering],
            days: (15, 110),
            temperature: Threshold::between(int(8), int(20)),
            humidity: Threshold::at_least(int(80)),
            action: "Spray a preventive fungicide (propiconazole or tebuconazole) and check lower leaves daily",
        },
        Rule {
            id: "leaf_rust",
            name: "Leaf Rust",
            category: RiskCategory::Disease,
            severity: RiskLevel::Medium,
            stages: &[Jointing, Booting, Flowering],
            days: (36, 110),
            temperature: Threshold::between(int(15), int(25)),
            humidity: Threshold::at_least(int(80)),
            action: "Scout twice a week and avoid irrigating at night",
        },
        Rule {
            id: "powdery_mildew",
            name: "Powdery Mildew",
            category: RiskCategory::Disease,
            severity: RiskLevel::Medium,
            stages: &[Tillering, Jointing, Booting],
            days: (15, 75),
            temperature: Threshold::between(int(15), int(22)),
            humidity: Threshold::at_least(int(70)),
            action: "Avoid excess nitrogen and spray sulphur if white patches appear",
        },
        Rule {
            id: "karnal_bunt",
            name: "Karnal Bunt",
            category: RiskCategory::Disease,
            severity: RiskLevel::High,
            stages: &[Flowering],
            days: (76, 110),
            temperature: Threshold::between(int(18), int(24)),
            humidity: Threshold::at_least(int(70)),
            action: "Do not irrigate during heading and use certified seed next season",
        },
        Rule {
            id: "terminal_heat",
            name: "Terminal Heat Stress",
            category: RiskCategory::Climate,
            severity: RiskLevel::High,
            stages: &[Flowering, GrainFilling],
            days: (76, 140),
            temperature: Threshold::at_least(int(32)),
            humidity: Threshold::default(),
            action: "Give a light irrigation in the evening to cool the canopy",
        },
        Rule {
            id: "frost",
            name: "Frost Injury",
            category: RiskCategory::Climate,
            severity: RiskLevel::High,
            stages: &[Jointing, Booting, Flowering],
            days: (36, 110),
            temperature: Threshold::at_most(int(2)),
            humidity: Threshold::default(),
            action: "Irrigate lightly before forecast frost nights",
        },
        Rule {
            id: "lodging",
            name: "Lodging",
            category: RiskCategory::Climate,
            severity: RiskLevel::Medium,
            stages: &[Booting, Flowering, GrainFilling],
            days: (56, 140),
            temperature: Threshold::default(),
            humidity: Threshold::at_least(int(85)),
            action: "Skip irrigation before storms and avoid late nitrogen",
        },
    ]
    .into_iter()
    .map(Rule::build)
    .collect();

    CropKnowledge {
        name: "Wheat".to_string(),
        stages: stages(&[
            (Germination, 0, 14),
            (Tillering, 15, 35),
            (Jointing, 36, 55),
            (Booting, 56, 75),
            (Flowering, 76, 110),
            (GrainFilling, 111, 140),
        ]),
        nutrients: NutrientBaseline {
            baseline_yield: int(40),
            per_acre: npk(int(52), int(40), int(25)),
            yield_step: int(10),
            nitrogen_per_step: int(10),
        },
        splits: vec![
            split("Sowing", Germination, 0, (30, 100, 100), true),
            split("Tillering", Tillering, 6, (40, 0, 0), true),
            split("Jointing", Jointing, 19, (30, 0, 0), false),
        ],
        stage_water_mm,
        risks,
    }
}

fn maize() -> CropKnowledge {
    let stage_water_mm = [
        (Germination, dec(25, 1)),
        (Vegetative, dec(40, 1)),
        (Tasseling, dec(55, 1)),
        (Flowering, dec(60, 1)),
        (GrainFilling, dec(45, 1)),
        (Maturity, dec(25, 1)),
    ]
    .into_iter()
    .collect();

    let risks = vec![
        Rule {
            id: "seedling_disease",
            name: "Seedling Disease",
            category: RiskCategory::Disease,
            severity: RiskLevel::High,
            stages: &[Germination],
            days: (0, 10),
            temperature: Threshold::at_most(int(10)),
            humidity: Threshold::default(),
            action: "Delay sowing until the soil warms and use treated seed",
        },
        Rule {
            id: "fall_armyworm",
            name: "Fall Armyworm",
            category: RiskCategory::Disease,
            severity: RiskLevel::High,
            stages: &[Vegetative, Tasseling],
            days: (11, 60),
            temperature: Threshold::at_least(int(38)),
            humidity: Threshold::default(),
            action: "Scout leaf whorls and apply emamectin benzoate if larvae are found",
        },
        Rule {
            id: "maize_leaf_blight",
            name: "Northern Leaf Blight",
            category: RiskCategory::Disease,
            severity: RiskLevel::Medium,
            stages: &[Vegetative, Tasseling, Flowering],
            days: (11, 75),
            temperature: Threshold::between(int(18), int(27)),
            humidity: Threshold::at_least(int(80)),
            action: "Remove infected lower leaves and spray mancozeb",
        },
        Rule {
            id: "stalk_borer",
            name: "Stalk Borer",
            category: RiskCategory::Disease,
            severity: RiskLevel::High,
            stages: &[Flowering],
            days: (61, 75),
            temperature: Threshold::at_least(int(35)),
            humidity: Threshold::default(),
            action: "Monitor silks and apply granular insecticide in the whorl",
        },
        Rule {
            id: "ear_rot",
            name: "Ear Rot",
            category: RiskCategory::Disease,
            severity: RiskLevel::Medium,
            stages: &[GrainFilling, Maturity],
            days: (76, 120),
            temperature: Threshold::default(),
            humidity: Threshold::at_least(int(80)),
            action: "Harvest at proper moisture and dry cobs before storage",
        },
        Rule {
            id: "heat_pollination",
            name: "Heat Stress at Pollination",
            category: RiskCategory::Climate,
            severity: RiskLevel::High,
            stages: &[Tasseling, Flowering],
            days: (51, 75),
            temperature: Threshold::at_least(int(35)),
            humidity: Threshold::default(),
            action: "Irrigate to keep the field moist through silking",
        },
        Rule {
            id: "cold_emergence",
            name: "Cold Emergence Stress",
            category: RiskCategory::Climate,
            severity: RiskLevel::Medium,
            stages: &[Germination],
            days: (0, 10),
            temperature: Threshold::at_most(int(12)),
            humidity: Threshold::default(),
            action: "Avoid irrigation on cold days until emergence",
        },
    ]
    .into_iter()
    .map(Rule::build)
    .collect();

    CropKnowledge {
        name: "Maize".to_string(),
        stages: stages(&[
            (Germination, 0, 10),
            (Vegetative, 11, 50),
            (Tasseling, 51, 60),
            (Flowering, 61, 75),
            (GrainFilling, 76, 110),
            (Maturity, 111, 120),
        ]),
        nutrients: NutrientBaseline {
            baseline_yield: int(80),
            per_acre: npk(int(100), int(50), int(30)),
            yield_step: int(10),
            nitrogen_per_step: int(10),
        },
        splits: vec![
            split("Sowing", Germination, 0, (25, 100, 100), true),
            split("Vegetative", Vegetative, 10, (50, 0, 0), true),
            split("Tasseling", Tasseling, 0, (25, 0, 0), false),
        ],
        stage_water_mm,
        risks,
    }
}
