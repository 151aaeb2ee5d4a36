//! Fertilizer planning
//!
//! Nutrient targets are derived from the crop baseline and target yield,
//! scaled by soil and irrigation multipliers, split over the crop's
//! application schedule and converted to market products. Statuses are
//! recomputed from the current day on every call.

use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{
    AdvisoryTip, AppliedMultiplier, ApplicationStatus, CropProfile, DasRange, FertilizerApplication,
    FertilizerPlan, FertilizerProduct, GrowthStage, MultiplierSource, Nutrient, NutrientAmounts,
    NutrientPlan, ProductQuantity, SoilType, TipKind, WeatherSnapshot,
};
use shared::{validate_area, validate_target_yield, validate_weather_snapshot};

use crate::error::{EngineError, EngineResult};
use crate::knowledge::{CropKnowledge, KnowledgeBase, SplitRule};

/// Plans fertilizer applications against a knowledge base
#[derive(Debug, Clone, Copy)]
pub struct FertilizerPlanner<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> FertilizerPlanner<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Build the season plan. Without a weather snapshot no weather tips
    /// are attached; everything else is identical.
    pub fn plan(
        &self,
        profile: &CropProfile,
        stage: &GrowthStage,
        weather: Option<&WeatherSnapshot>,
    ) -> EngineResult<FertilizerPlan> {
        validate_area(profile.area)?;
        validate_target_yield(profile.target_yield)?;
        if let Some(weather) = weather {
            validate_weather_snapshot(weather)?;
        }
        let crop = self.kb.crop(&profile.crop)?;
        let nutrients = self.nutrient_plan(profile, crop)?;

        let applications = crop
            .splits
            .iter()
            .map(|split| self.application(profile, crop, split, &nutrients.total, stage, weather))
            .collect::<EngineResult<Vec<_>>>()?;

        tracing::debug!(
            crop = %crop.name,
            das = stage.days_after_sowing,
            nitrogen = %nutrients.total.nitrogen,
            applications = applications.len(),
            "Fertilizer plan computed"
        );

        Ok(FertilizerPlan {
            nutrients,
            applications,
        })
    }

    /// Per-acre targets after the yield adjustment, before multipliers
    pub fn base_targets(&self, profile: &CropProfile) -> EngineResult<NutrientAmounts> {
        validate_target_yield(profile.target_yield)?;
        let crop = self.kb.crop(&profile.crop)?;
        Ok(base_targets(crop, profile.target_yield))
    }

    fn nutrient_plan(&self, profile: &CropProfile, crop: &CropKnowledge) -> EngineResult<NutrientPlan> {
        let base_per_acre = base_targets(crop, profile.target_yield);

        let soil = self.kb.soil_multiplier(profile.soil_type)?;
        let irrigation = self.kb.irrigation_multiplier(profile.irrigation_method)?;

        let mut multipliers = Vec::new();
        for nutrient in Nutrient::ALL {
            let soil_factor = soil.get(nutrient);
            if soil_factor != Decimal::ONE {
                multipliers.push(AppliedMultiplier {
                    source: MultiplierSource::Soil,
                    nutrient,
                    factor: soil_factor,
                    reason: format!("{} soil", profile.soil_type.to_string().to_lowercase()),
                });
            }
        }
        for nutrient in Nutrient::ALL {
            let irrigation_factor = irrigation.get(nutrient);
            if irrigation_factor != Decimal::ONE {
                multipliers.push(AppliedMultiplier {
                    source: MultiplierSource::Irrigation,
                    nutrient,
                    factor: irrigation_factor,
                    reason: format!("{} irrigation", profile.irrigation_method.to_string().to_lowercase()),
                });
            }
        }

        // Both factors apply to the base target once
        let total = base_per_acre
            .map(|nutrient, base| base * soil.get(nutrient) * irrigation.get(nutrient) * profile.area);

        let products = size_products(self.kb, &total)?;
        let total_cost = products.iter().map(|p| p.cost).sum();

        Ok(NutrientPlan {
            crop: crop.name.clone(),
            area_acres: profile.area,
            base_per_acre,
            total,
            multipliers,
            products,
            total_cost,
            currency: self.kb.currency.clone(),
        })
    }

    fn application(
        &self,
        profile: &CropProfile,
        crop: &CropKnowledge,
        split: &SplitRule,
        total: &NutrientAmounts,
        stage: &GrowthStage,
        weather: Option<&WeatherSnapshot>,
    ) -> EngineResult<FertilizerApplication> {
        let anchor = crop.stage(split.anchor_stage).ok_or_else(|| {
            EngineError::DataIntegrity(format!(
                "{}: split {} anchored to unknown stage {}",
                crop.name, split.name, split.anchor_stage
            ))
        })?;
        let tolerance = self.kb.fertilizer.tolerance_days;
        let das = stage.days_after_sowing;
        let target_das = anchor.days.start + split.offset_days;
        let window = DasRange::new(target_das.saturating_sub(tolerance), target_das + tolerance);
        let target_date = profile.sowing_date + Duration::days(i64::from(target_das));
        let status = ApplicationStatus::classify(das, target_das, tolerance);

        let hundred = Decimal::ONE_HUNDRED;
        let nutrients = total.map(|nutrient, amount| amount * split.fractions.get(nutrient) / hundred);
        let products = size_products(self.kb, &nutrients)?;
        let cost = products.iter().map(|p| p.cost).sum();

        let mut tips = Vec::new();
        match status {
            ApplicationStatus::DueNow => tips.push(AdvisoryTip {
                kind: TipKind::DueNow,
                message: format!(
                    "Apply the {} dose now; the window closes on day {}",
                    split.name, window.end
                ),
            }),
            ApplicationStatus::Missed if split.critical => tips.push(AdvisoryTip {
                kind: TipKind::MissedCritical,
                message: format!(
                    "The critical {} application was missed; consult an extension expert as this affects yield",
                    split.name
                ),
            }),
            _ => {}
        }

        if status != ApplicationStatus::Missed {
            if profile.soil_type == SoilType::Sandy && nutrients.nitrogen > Decimal::ZERO {
                tips.push(AdvisoryTip {
                    kind: TipKind::SplitDoseSandySoil,
                    message: "Sandy soil loses nitrogen quickly; split this urea dose in two, a week apart"
                        .to_string(),
                });
            }
            if let Some(weather) = weather {
                let window_start = profile.sowing_date + Duration::days(i64::from(window.start));
                let window_end = profile.sowing_date + Duration::days(i64::from(window.end));
                let rain = weather.forecast_rainfall_between(window_start, window_end);
                if rain > self.kb.fertilizer.heavy_rain_mm {
                    tracing::debug!(application = %split.name, %rain, "Heavy rain over application window");
                    tips.push(AdvisoryTip {
                        kind: TipKind::HeavyRainDelay,
                        message: format!(
                            "{} mm of rain is forecast around the {} application; delay it until after the rain to avoid leaching",
                            rain.round_dp(1),
                            split.name
                        ),
                    });
                }
            }
        }

        Ok(FertilizerApplication {
            name: split.name.clone(),
            anchor_stage: split.anchor_stage,
            fractions: split.fractions,
            nutrients,
            products,
            cost,
            target_das,
            window,
            target_date,
            days_until_target: i64::from(target_das) - i64::from(das),
            critical: split.critical,
            status,
            tips,
        })
    }
}

/// Yield-adjusted per-acre targets. Only yield above the baseline earns
/// extra nitrogen.
fn base_targets(crop: &CropKnowledge, target_yield: Decimal) -> NutrientAmounts {
    let baseline = &crop.nutrients;
    let surplus = (target_yield - baseline.baseline_yield).max(Decimal::ZERO);
    let extra_nitrogen = surplus / baseline.yield_step * baseline.nitrogen_per_step;
    let mut targets = baseline.per_acre;
    targets.nitrogen += extra_nitrogen;
    targets
}

/// Convert nutrient masses to whole bags of DAP, Urea and MOP.
///
/// DAP is sized for phosphate first and its nitrogen is credited before
/// Urea covers what remains.
fn size_products(kb: &KnowledgeBase, nutrients: &NutrientAmounts) -> EngineResult<Vec<ProductQuantity>> {
    let dap = kb.product(FertilizerProduct::Dap)?;
    let urea = kb.product(FertilizerProduct::Urea)?;
    let mop = kb.product(FertilizerProduct::Mop)?;

    let dap_kg = nutrients.phosphorus / dap.content.phosphorus;
    let nitrogen_credit = dap_kg * dap.content.nitrogen;
    let urea_kg = (nutrients.nitrogen - nitrogen_credit).max(Decimal::ZERO) / urea.content.nitrogen;
    let mop_kg = nutrients.potassium / mop.content.potassium;

    let mut products = Vec::new();
    for (product, mass_kg) in [
        (FertilizerProduct::Dap, dap_kg),
        (FertilizerProduct::Urea, urea_kg),
        (FertilizerProduct::Mop, mop_kg),
    ] {
        if mass_kg <= Decimal::ZERO {
            continue;
        }
        let spec = kb.product(product)?;
        let bags = (mass_kg / spec.bag_kg).ceil();
        let bag_count = bags
            .to_u32()
            .ok_or_else(|| EngineError::DataIntegrity(format!("{} bag count overflow", product)))?;
        products.push(ProductQuantity {
            product,
            mass_kg: mass_kg.round_dp(2),
            bags: bag_count,
            cost: bags * spec.bag_price,
        });
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dap_nitrogen_credit() {
        let kb = KnowledgeBase::builtin();
        // 46 kg P needs 100 kg DAP carrying 18 kg N; 64 kg N remain for urea
        let nutrients = NutrientAmounts::new(Decimal::from(82), Decimal::from(46), Decimal::ZERO);
        let products = size_products(&kb, &nutrients).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product, FertilizerProduct::Dap);
        assert_eq!(products[0].mass_kg, Decimal::from(100));
        assert_eq!(products[0].bags, 2);
        assert_eq!(products[0].cost, Decimal::from(24_000));
        assert_eq!(products[1].product, FertilizerProduct::Urea);
        // 64 / 0.46 = 139.13 kg -> 3 bags
        assert_eq!(products[1].bags, 3);
    }

    #[test]
    fn test_no_products_for_zero_nutrients() {
        let kb = KnowledgeBase::builtin();
        let products = size_products(&kb, &NutrientAmounts::default()).unwrap();
        assert!(products.is_empty());
    }
}
