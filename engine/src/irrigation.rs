//! Irrigation planning
//!
//! Daily water requirement comes from the stage baseline adjusted for heat
//! and humidity. A soil-moisture depletion model, bounded by the soil's
//! available water, decides when the next irrigation falls due.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use shared::{
    CropProfile, GrowthStage, GrowthStageKind, IrrigationEvent, IrrigationPlan, IrrigationStatus,
    IrrigationTiming, IrrigationWarning, IrrigationWarningKind, MoistureState, WaterRequirement,
    WeatherSnapshot,
};
use shared::{validate_area, validate_weather_snapshot};

use crate::error::{EngineError, EngineResult};
use crate::growth_stage::GrowthStageResolver;
use crate::knowledge::{CropKnowledge, KnowledgeBase, WaterConstants};

/// Plans irrigation against a knowledge base
#[derive(Debug, Clone, Copy)]
pub struct IrrigationPlanner<'a> {
    kb: &'a KnowledgeBase,
}

/// Requirement before rainfall is taken into account
struct GrossRequirement {
    baseline: Decimal,
    temperature_adjustment: Decimal,
    humidity_adjustment: Decimal,
    gross: Decimal,
}

impl<'a> IrrigationPlanner<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Today's water requirement for the crop's current stage
    pub fn requirement(
        &self,
        profile: &CropProfile,
        stage: &GrowthStage,
        weather: &WeatherSnapshot,
    ) -> EngineResult<WaterRequirement> {
        validate_area(profile.area)?;
        validate_weather_snapshot(weather)?;
        let crop = self.kb.crop(&profile.crop)?;
        let water = &self.kb.water;
        let gross = self.gross_requirement(
            crop,
            stage.stage,
            weather.current.temperature_celsius,
            weather.current.humidity_percent,
        )?;
        let trailing_rainfall = weather.trailing_rainfall(water.trailing_rainfall_days as usize);

        Ok(WaterRequirement {
            stage: stage.stage,
            baseline_mm: gross.baseline,
            temperature_adjustment_mm: gross.temperature_adjustment,
            humidity_adjustment_mm: gross.humidity_adjustment,
            gross_mm: gross.gross,
            trailing_rainfall_mm: trailing_rainfall,
            net_mm: (gross.gross - trailing_rainfall).max(Decimal::ZERO),
        })
    }

    /// Requirement, current moisture deficit and the irrigation events over
    /// the forecast horizon
    pub fn plan(
        &self,
        profile: &CropProfile,
        stage: &GrowthStage,
        weather: &WeatherSnapshot,
    ) -> EngineResult<IrrigationPlan> {
        let crop = self.kb.crop(&profile.crop)?;
        let water = &self.kb.water;
        let available = self.kb.soil_water(profile.soil_type)?.available_water_mm();
        let requirement = self.requirement(profile, stage, weather)?;

        let das = stage.days_after_sowing;
        let today = profile.sowing_date + Duration::days(i64::from(das));

        // Without a recorded irrigation the soil is taken to have been at
        // field capacity when the trailing rainfall window opened.
        let days_since_irrigation = match profile.last_irrigation_date {
            Some(last) => u32::try_from((today - last).num_days()).map_err(|_| {
                EngineError::InvalidInput("Last irrigation date cannot be in the future".to_string())
            })?,
            None => water.trailing_rainfall_days,
        };
        let depletion = (Decimal::from(days_since_irrigation) * requirement.gross_mm
            - requirement.trailing_rainfall_mm)
            .max(Decimal::ZERO);
        let critical = depletion >= available * water.critical_depletion_ratio;

        let mut events = Vec::new();
        let mut running = depletion;
        if depletion >= available {
            let status = if critical {
                IrrigationStatus::WarningCritical
            } else {
                IrrigationStatus::Overdue
            };
            events.push(self.event(
                profile,
                today,
                das,
                stage.stage,
                depletion,
                status,
                weather.current.peak_temperature(),
            ));
            running = Decimal::ZERO;
        }

        let resolver = GrowthStageResolver::new(self.kb);
        for day in weather.forecast.iter().filter(|day| day.date > today) {
            let Ok(offset) = u32::try_from((day.date - today).num_days()) else {
                continue;
            };
            let day_das = das + offset;
            let day_stage = match resolver.resolve(&profile.crop, day_das) {
                Ok(day_stage) => day_stage,
                // Crop harvested before the end of the horizon
                Err(EngineError::OutOfRange { .. }) => break,
                Err(e) => return Err(e),
            };
            let gross = self.gross_requirement(
                crop,
                day_stage.stage,
                day.temperature_celsius,
                day.humidity_percent,
            )?;
            running = (running + gross.gross - day.rainfall_mm).max(Decimal::ZERO);
            if running >= available {
                events.push(self.event(
                    profile,
                    day.date,
                    day_das,
                    day_stage.stage,
                    running,
                    IrrigationStatus::Scheduled,
                    day.peak_temperature(),
                ));
                running = Decimal::ZERO;
            }
        }

        let warnings = self.warnings(profile, weather, today, depletion, available, critical, &events);

        tracing::debug!(
            crop = %crop.name,
            das,
            depletion = %depletion,
            available = %available,
            events = events.len(),
            "Irrigation plan computed"
        );

        Ok(IrrigationPlan {
            requirement,
            moisture: MoistureState {
                available_water_mm: available,
                depletion_mm: depletion.round_dp(2),
                depletion_percent: (depletion / available * Decimal::ONE_HUNDRED).round_dp(1),
                days_since_irrigation,
            },
            events,
            warnings,
        })
    }

    fn gross_requirement(
        &self,
        crop: &CropKnowledge,
        stage: GrowthStageKind,
        temperature: Decimal,
        humidity: Decimal,
    ) -> EngineResult<GrossRequirement> {
        let water = &self.kb.water;
        let baseline = crop.water_baseline(stage)?;
        let temperature_adjustment =
            (temperature - water.reference_temperature_celsius).max(Decimal::ZERO) * water.mm_per_degree_above;
        let humidity_adjustment = (humidity - water.reference_humidity_percent).max(Decimal::ZERO)
            / water.humidity_step_percent
            * water.mm_per_humidity_step;
        let gross = (baseline + temperature_adjustment - humidity_adjustment).max(Decimal::ZERO);
        Ok(GrossRequirement {
            baseline,
            temperature_adjustment,
            humidity_adjustment,
            gross,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn event(
        &self,
        profile: &CropProfile,
        date: NaiveDate,
        days_after_sowing: u32,
        stage: GrowthStageKind,
        depth: Decimal,
        status: IrrigationStatus,
        peak_temperature: Decimal,
    ) -> IrrigationEvent {
        let water = &self.kb.water;
        IrrigationEvent {
            date,
            days_after_sowing,
            stage,
            depth_mm: depth.round_dp(2),
            volume_liters: (depth * profile.area * water.liters_per_mm_per_area_unit).round_dp(0),
            status,
            timing: irrigation_timing(water, peak_temperature),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn warnings(
        &self,
        profile: &CropProfile,
        weather: &WeatherSnapshot,
        today: NaiveDate,
        depletion: Decimal,
        available: Decimal,
        critical: bool,
        events: &[IrrigationEvent],
    ) -> Vec<IrrigationWarning> {
        let water = &self.kb.water;
        let mut warnings = Vec::new();

        if critical {
            warnings.push(IrrigationWarning {
                kind: IrrigationWarningKind::CriticalMoisture,
                message: "Soil moisture has fallen below the critical level; irrigate today".to_string(),
            });
        } else if depletion >= available * water.low_moisture_ratio {
            warnings.push(IrrigationWarning {
                kind: IrrigationWarningKind::LowMoisture,
                message: format!(
                    "Soil has lost {} mm of {} mm available water; prepare to irrigate",
                    depletion.round_dp(1),
                    available
                ),
            });
        }

        let lookahead_end = today + Duration::days(i64::from(water.heavy_rain_lookahead_days.max(1)) - 1);
        let expected_rain = weather.forecast_rainfall_between(today, lookahead_end);
        if expected_rain > water.heavy_rain_skip_mm {
            warnings.push(IrrigationWarning {
                kind: IrrigationWarningKind::HeavyRainExpected,
                message: format!(
                    "{} mm of rain expected in the next {} days; irrigation can be postponed",
                    expected_rain.round_dp(1),
                    water.heavy_rain_lookahead_days
                ),
            });
        }

        if !profile.irrigation_method.has_supply() && !events.is_empty() {
            warnings.push(IrrigationWarning {
                kind: IrrigationWarningKind::RainfedSupply,
                message: "Irrigation is due but the farm is rainfed; arrange supplementary water if possible"
                    .to_string(),
            });
        }

        warnings
    }
}

/// Time of day to irrigate given the day's peak temperature
pub fn irrigation_timing(water: &WaterConstants, peak_temperature: Decimal) -> IrrigationTiming {
    if peak_temperature > water.hot_day_celsius {
        IrrigationTiming::EarlyMorningOrEvening
    } else if peak_temperature > water.warm_day_celsius {
        IrrigationTiming::Morning
    } else {
        IrrigationTiming::LateMorning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_thresholds_are_exclusive() {
        let kb = KnowledgeBase::builtin();
        let water = &kb.water;
        assert_eq!(irrigation_timing(water, Decimal::from(33)), IrrigationTiming::EarlyMorningOrEvening);
        assert_eq!(irrigation_timing(water, Decimal::from(32)), IrrigationTiming::Morning);
        assert_eq!(irrigation_timing(water, Decimal::from(28)), IrrigationTiming::LateMorning);
    }
}
