//! Tests for fertilizer planning
//! Verifies nutrient targets, multipliers, stage splits, statuses and tips

use chrono::{Duration, NaiveDate};
use engine::{FertilizerPlanner, GrowthStageResolver, KnowledgeBase};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    ApplicationStatus, CropProfile, CurrentConditions, DailyForecast, FertilizerPlan,
    FertilizerProduct, GrowthStageKind, IrrigationMethod, MultiplierSource, Nutrient, SoilType,
    TipKind, WeatherSnapshot,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn sowing() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
}

fn profile(crop: &str, target_yield: &str, soil: SoilType, irrigation: IrrigationMethod) -> CropProfile {
    CropProfile {
        crop: crop.to_string(),
        sowing_date: sowing(),
        target_yield: dec(target_yield),
        soil_type: soil,
        irrigation_method: irrigation,
        area: Decimal::ONE,
        last_irrigation_date: None,
    }
}

fn weather(as_of: NaiveDate, rain_by_offset: &[(i64, &str)]) -> WeatherSnapshot {
    let forecast = (0..7)
        .map(|offset| {
            let rain = rain_by_offset
                .iter()
                .find(|(o, _)| *o == offset)
                .map(|(_, r)| dec(r))
                .unwrap_or(Decimal::ZERO);
            DailyForecast {
                date: as_of + Duration::days(offset),
                rainfall_mm: rain,
                temperature_celsius: dec("18"),
                temperature_max_celsius: None,
                humidity_percent: dec("60"),
            }
        })
        .collect();
    WeatherSnapshot {
        observed_on: as_of,
        current: CurrentConditions {
            temperature_celsius: dec("18"),
            humidity_percent: dec("60"),
            wind_kph: dec("6"),
            temperature_max_celsius: None,
        },
        forecast,
        recent_rainfall_mm: vec![Decimal::ZERO; 3],
    }
}

fn plan(kb: &KnowledgeBase, profile: &CropProfile, das: u32, weather: Option<&WeatherSnapshot>) -> FertilizerPlan {
    let stage = GrowthStageResolver::new(kb).resolve(&profile.crop, das).unwrap();
    FertilizerPlanner::new(kb).plan(profile, &stage, weather).unwrap()
}

// =============================================================================
// Unit Tests
// =============================================================================

mod unit_tests {
    use super::*;

    #[test]
    fn sandy_tubewell_high_yield_at_tillering() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "80", SoilType::Sandy, IrrigationMethod::TubeWell);
        let stage = GrowthStageResolver::new(&kb).resolve("wheat", 20).unwrap();
        assert_eq!(stage.stage, GrowthStageKind::Tillering);

        let plan = FertilizerPlanner::new(&kb).plan(&p, &stage, None).unwrap();
        let nutrients = &plan.nutrients;

        // 40 maunds above baseline adds 40 kg N before the soil multiplier
        assert_eq!(nutrients.base_per_acre.nitrogen, dec("92"));
        assert_eq!(nutrients.total.nitrogen, dec("110.4"));
        assert_eq!(nutrients.total.phosphorus, dec("40"));
        assert_eq!(nutrients.total.potassium, dec("25"));

        assert_eq!(nutrients.multipliers.len(), 1);
        assert_eq!(nutrients.multipliers[0].source, MultiplierSource::Soil);
        assert_eq!(nutrients.multipliers[0].nutrient, Nutrient::Nitrogen);
        assert_eq!(nutrients.multipliers[0].factor, dec("1.20"));
    }

    #[test]
    fn statuses_at_tillering() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "80", SoilType::Sandy, IrrigationMethod::TubeWell);
        let plan = plan(&kb, &p, 20, None);

        let statuses: Vec<_> = plan.applications.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            vec![ApplicationStatus::Missed, ApplicationStatus::DueNow, ApplicationStatus::Upcoming]
        );
        assert_eq!(plan.next_application().map(|a| a.name.as_str()), Some("Tillering"));
        assert_eq!(plan.applications[1].target_das, 21);
        assert_eq!(plan.applications[1].days_until_target, 1);
        assert_eq!(plan.applications[1].target_date, NaiveDate::from_ymd_opt(2025, 11, 22).unwrap());
    }

    #[test]
    fn statuses_at_day_58() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "40", SoilType::Loam, IrrigationMethod::Canal);
        let plan = plan(&kb, &p, 58, None);

        let sowing_app = &plan.applications[0];
        assert_eq!(sowing_app.target_das, 0);
        assert_eq!(sowing_app.status, ApplicationStatus::Missed);
        assert!(sowing_app.tips.iter().any(|t| t.kind == TipKind::MissedCritical));

        let jointing = &plan.applications[2];
        assert_eq!(jointing.name, "Jointing");
        assert!(jointing.target_das >= 36 && jointing.target_das <= 55);
        assert_eq!(jointing.status, ApplicationStatus::DueNow);
        assert_eq!(plan.missed().count(), 2);
    }

    #[test]
    fn season_products_use_dap_nitrogen_credit() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "80", SoilType::Sandy, IrrigationMethod::TubeWell);
        let plan = plan(&kb, &p, 20, None);

        let bags: Vec<_> = plan
            .nutrients
            .products
            .iter()
            .map(|q| (q.product, q.bags))
            .collect();
        assert_eq!(
            bags,
            vec![
                (FertilizerProduct::Dap, 2),
                (FertilizerProduct::Urea, 5),
                (FertilizerProduct::Mop, 1)
            ]
        );
        assert_eq!(plan.nutrients.total_cost, dec("55500"));
        assert_eq!(plan.nutrients.currency, "PKR");
    }

    #[test]
    fn later_splits_buy_only_urea() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "40", SoilType::Loam, IrrigationMethod::Canal);
        let plan = plan(&kb, &p, 20, None);

        let tillering = &plan.applications[1];
        assert_eq!(tillering.nutrients.phosphorus, Decimal::ZERO);
        assert_eq!(tillering.products.len(), 1);
        assert_eq!(tillering.products[0].product, FertilizerProduct::Urea);
        assert_eq!(tillering.cost, tillering.products[0].cost);
    }

    #[test]
    fn rainfed_reduces_every_nutrient() {
        let kb = KnowledgeBase::builtin();
        let rainfed = plan(&kb, &profile("wheat", "40", SoilType::Loam, IrrigationMethod::Rainfed), 10, None);
        let canal = plan(&kb, &profile("wheat", "40", SoilType::Loam, IrrigationMethod::Canal), 10, None);

        assert_eq!(rainfed.nutrients.total.nitrogen, canal.nutrients.total.nitrogen * dec("0.9"));
        assert_eq!(rainfed.nutrients.total.phosphorus, dec("36"));
        assert_eq!(rainfed.nutrients.total.potassium, dec("22.5"));
        assert_eq!(rainfed.nutrients.multipliers.len(), 3);
        assert!(rainfed
            .nutrients
            .multipliers
            .iter()
            .all(|m| m.source == MultiplierSource::Irrigation));
    }

    #[test]
    fn clay_raises_only_phosphorus() {
        let kb = KnowledgeBase::builtin();
        let clay = plan(&kb, &profile("wheat", "40", SoilType::Clay, IrrigationMethod::Canal), 10, None);
        assert_eq!(clay.nutrients.total.nitrogen, dec("52"));
        assert_eq!(clay.nutrients.total.phosphorus, dec("46"));
        assert_eq!(clay.nutrients.total.potassium, dec("25"));
    }

    #[test]
    fn multipliers_compose_on_base() {
        let kb = KnowledgeBase::builtin();
        let plan = plan(&kb, &profile("wheat", "40", SoilType::Sandy, IrrigationMethod::Rainfed), 10, None);
        // 52 * 1.20 * 0.90
        assert_eq!(plan.nutrients.total.nitrogen, dec("56.16"));
    }

    #[test]
    fn yield_below_baseline_keeps_baseline_nitrogen() {
        let kb = KnowledgeBase::builtin();
        let plan = plan(&kb, &profile("wheat", "25", SoilType::Loam, IrrigationMethod::Canal), 10, None);
        assert_eq!(plan.nutrients.base_per_acre.nitrogen, dec("52"));
    }

    #[test]
    fn area_scales_totals() {
        let kb = KnowledgeBase::builtin();
        let mut p = profile("maize", "80", SoilType::Loam, IrrigationMethod::Canal);
        p.area = dec("2.5");
        let plan = plan(&kb, &p, 5, None);
        assert_eq!(plan.nutrients.total.nitrogen, dec("250"));
        assert_eq!(plan.nutrients.area_acres, dec("2.5"));
    }

    #[test]
    fn heavy_rain_over_window_attaches_delay_tip() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "40", SoilType::Loam, IrrigationMethod::Canal);
        let as_of = sowing() + Duration::days(50);
        // Jointing target is day 55; its window covers days 52-58
        let w = weather(as_of, &[(3, "20"), (4, "15")]);

        let with_weather = plan(&kb, &p, 50, Some(&w));
        let jointing = &with_weather.applications[2];
        assert_eq!(jointing.status, ApplicationStatus::Upcoming);
        assert!(jointing.tips.iter().any(|t| t.kind == TipKind::HeavyRainDelay));

        let without_weather = plan(&kb, &p, 50, None);
        assert!(without_weather.applications[2]
            .tips
            .iter()
            .all(|t| t.kind != TipKind::HeavyRainDelay));
    }

    #[test]
    fn light_rain_attaches_no_delay_tip() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "40", SoilType::Loam, IrrigationMethod::Canal);
        let as_of = sowing() + Duration::days(50);
        let w = weather(as_of, &[(3, "10"), (4, "10")]);
        let plan = plan(&kb, &p, 50, Some(&w));
        assert!(plan
            .applications
            .iter()
            .flat_map(|a| a.tips.iter())
            .all(|t| t.kind != TipKind::HeavyRainDelay));
    }

    #[test]
    fn sandy_soil_split_dose_tip_only_when_pending() {
        let kb = KnowledgeBase::builtin();
        let p = profile("wheat", "40", SoilType::Sandy, IrrigationMethod::Canal);
        let plan = plan(&kb, &p, 20, None);
        assert!(plan.applications[0].tips.iter().all(|t| t.kind != TipKind::SplitDoseSandySoil));
        assert!(plan.applications[1].tips.iter().any(|t| t.kind == TipKind::SplitDoseSandySoil));
        assert!(plan.applications[1].tips.iter().any(|t| t.kind == TipKind::DueNow));
    }

    #[test]
    fn unknown_crop_fails() {
        let kb = KnowledgeBase::builtin();
        let wheat_stage = GrowthStageResolver::new(&kb).resolve("wheat", 10).unwrap();
        let p = profile("barley", "40", SoilType::Loam, IrrigationMethod::Canal);
        let err = FertilizerPlanner::new(&kb).plan(&p, &wheat_stage, None).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_CROP");
    }
}

// =============================================================================
// Property Tests
// =============================================================================

mod property_tests {
    use super::*;

    fn soil_strategy() -> impl Strategy<Value = SoilType> {
        prop::sample::select(SoilType::ALL.to_vec())
    }

    fn irrigation_strategy() -> impl Strategy<Value = IrrigationMethod> {
        prop::sample::select(IrrigationMethod::ALL.to_vec())
    }

    fn crop_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("wheat"), Just("maize")]
    }

    fn yield_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..2000).prop_map(|v| Decimal::new(v, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Split fractions sum to 100% for every nutrient of every crop
        #[test]
        fn split_fractions_sum_to_hundred(crop in crop_strategy()) {
            let kb = KnowledgeBase::builtin();
            let knowledge = kb.crop(crop).unwrap();
            for nutrient in Nutrient::ALL {
                let total: Decimal = knowledge.splits.iter().map(|s| s.fractions.get(nutrient)).sum();
                prop_assert_eq!(total, Decimal::ONE_HUNDRED);
            }
        }

        /// Application nutrient masses add up to the season totals
        #[test]
        fn applications_cover_totals(
            crop in crop_strategy(),
            target in yield_strategy(),
            soil in soil_strategy(),
            irrigation in irrigation_strategy(),
            das in 0u32..=110,
        ) {
            let kb = KnowledgeBase::builtin();
            let p = CropProfile { target_yield: target, ..profile(crop, "40", soil, irrigation) };
            let plan = plan(&kb, &p, das, None);
            for nutrient in Nutrient::ALL {
                let applied: Decimal = plan.applications.iter().map(|a| a.nutrients.get(nutrient)).sum();
                prop_assert_eq!(applied, plan.nutrients.total.get(nutrient));
            }
        }

        /// Identical inputs give identical plans
        #[test]
        fn planning_is_idempotent(
            target in yield_strategy(),
            soil in soil_strategy(),
            irrigation in irrigation_strategy(),
            das in 0u32..=140,
            rain in 0i64..80,
        ) {
            let kb = KnowledgeBase::builtin();
            let p = CropProfile { target_yield: target, ..profile("wheat", "40", soil, irrigation) };
            let w = weather(sowing() + Duration::days(i64::from(das)), &[(2, "0"), (3, "0")]);
            let w = WeatherSnapshot {
                forecast: w.forecast.into_iter().map(|d| DailyForecast { rainfall_mm: Decimal::from(rain), ..d }).collect(),
                ..w
            };
            let first = plan(&kb, &p, das, Some(&w));
            let second = plan(&kb, &p, das, Some(&w));
            prop_assert_eq!(first, second);
        }

        /// Raising the target yield never lowers the nitrogen target
        #[test]
        fn nitrogen_monotonic_in_yield(
            crop in crop_strategy(),
            low in yield_strategy(),
            bump in 0i64..500,
            soil in soil_strategy(),
            irrigation in irrigation_strategy(),
        ) {
            let kb = KnowledgeBase::builtin();
            let high = low + Decimal::new(bump, 1);
            let low_plan = plan(&kb, &CropProfile { target_yield: low, ..profile(crop, "40", soil, irrigation) }, 5, None);
            let high_plan = plan(&kb, &CropProfile { target_yield: high, ..profile(crop, "40", soil, irrigation) }, 5, None);
            prop_assert!(high_plan.nutrients.total.nitrogen >= low_plan.nutrients.total.nitrogen);
        }

        /// Rainfed totals never exceed tube-well totals
        #[test]
        fn rainfed_never_exceeds_tubewell(
            crop in crop_strategy(),
            target in yield_strategy(),
            soil in soil_strategy(),
        ) {
            let kb = KnowledgeBase::builtin();
            let rainfed = plan(&kb, &CropProfile { target_yield: target, ..profile(crop, "40", soil, IrrigationMethod::Rainfed) }, 5, None);
            let tubewell = plan(&kb, &CropProfile { target_yield: target, ..profile(crop, "40", soil, IrrigationMethod::TubeWell) }, 5, None);
            for nutrient in Nutrient::ALL {
                prop_assert!(rainfed.nutrients.total.get(nutrient) <= tubewell.nutrients.total.get(nutrient));
            }
        }

        /// Each status is the pure function of day, target and tolerance
        #[test]
        fn status_derived_from_day(das in 0u32..=110) {
            let kb = KnowledgeBase::builtin();
            let plan = plan(&kb, &profile("wheat", "40", SoilType::Loam, IrrigationMethod::Canal), das, None);
            for app in &plan.applications {
                prop_assert_eq!(app.status, ApplicationStatus::classify(das, app.target_das, 3));
                prop_assert_eq!(app.days_until_target, i64::from(app.target_das) - i64::from(das));
            }
        }
    }
}
