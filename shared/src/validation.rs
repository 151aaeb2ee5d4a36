//! Validation utilities for the Agronomic Advisory Platform
//!
//! Checks shared by the engine, the backend request layer and the WASM
//! bindings. Knowledge-base specific checks live in the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{CropProfile, StageBoundary, WeatherSnapshot};

/// Largest accepted farm, in acres
pub const MAX_AREA_ACRES: u32 = 100_000;

/// Largest accepted target yield, in maunds per acre
pub const MAX_TARGET_YIELD: u32 = 1_000;

// ============================================================================
// Crop Profile Validations
// ============================================================================

/// Validate farm area is positive and at most [`MAX_AREA_ACRES`]
pub fn validate_area(area: Decimal) -> Result<(), &'static str> {
    if area <= Decimal::ZERO {
        return Err("Farm area must be greater than zero");
    }
    if area > Decimal::from(MAX_AREA_ACRES) {
        return Err("Farm area cannot exceed 100000 acres");
    }
    Ok(())
}

/// Validate target yield is positive and at most [`MAX_TARGET_YIELD`]
pub fn validate_target_yield(target_yield: Decimal) -> Result<(), &'static str> {
    if target_yield <= Decimal::ZERO {
        return Err("Target yield must be greater than zero");
    }
    if target_yield > Decimal::from(MAX_TARGET_YIELD) {
        return Err("Target yield cannot exceed 1000 maunds per acre");
    }
    Ok(())
}

/// Validate the sowing date is not after the evaluation date
pub fn validate_sowing_date(sowing_date: NaiveDate, as_of: NaiveDate) -> Result<(), &'static str> {
    if sowing_date > as_of {
        return Err("Sowing date cannot be in the future");
    }
    Ok(())
}

/// Validate a complete crop profile against an evaluation date
pub fn validate_crop_profile(profile: &CropProfile, as_of: NaiveDate) -> Result<(), &'static str> {
    if profile.crop_key().is_empty() {
        return Err("Crop is required");
    }
    validate_area(profile.area)?;
    validate_target_yield(profile.target_yield)?;
    validate_sowing_date(profile.sowing_date, as_of)?;
    if let Some(last) = profile.last_irrigation_date {
        if last > as_of {
            return Err("Last irrigation date cannot be in the future");
        }
        if last < profile.sowing_date {
            return Err("Last irrigation date cannot precede sowing");
        }
    }
    Ok(())
}

// ============================================================================
// Weather Validations
// ============================================================================

/// Validate relative humidity is a percentage
pub fn validate_humidity(humidity: Decimal) -> Result<(), &'static str> {
    if humidity < Decimal::ZERO || humidity > Decimal::from(100) {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}

/// Validate daily rainfall is not negative and physically plausible
pub fn validate_rainfall(rainfall_mm: Decimal) -> Result<(), &'static str> {
    if rainfall_mm < Decimal::ZERO {
        return Err("Rainfall cannot be negative");
    }
    if rainfall_mm > Decimal::from(2_000) {
        return Err("Daily rainfall cannot exceed 2000 mm");
    }
    Ok(())
}

/// Validate air temperature (Celsius)
pub fn validate_temperature(temperature: Decimal) -> Result<(), &'static str> {
    if temperature < Decimal::from(-60) || temperature > Decimal::from(60) {
        return Err("Temperature must be between -60 and 60 °C");
    }
    Ok(())
}

/// Validate wind speed (km/h)
pub fn validate_wind(wind_kph: Decimal) -> Result<(), &'static str> {
    if wind_kph < Decimal::ZERO || wind_kph > Decimal::from(400) {
        return Err("Wind speed must be between 0 and 400 km/h");
    }
    Ok(())
}

/// Validate every reading of a weather snapshot and the forecast order
pub fn validate_weather_snapshot(weather: &WeatherSnapshot) -> Result<(), &'static str> {
    let current = &weather.current;
    validate_temperature(current.temperature_celsius)?;
    if let Some(max) = current.temperature_max_celsius {
        validate_temperature(max)?;
    }
    validate_humidity(current.humidity_percent)?;
    validate_wind(current.wind_kph)?;

    for rainfall in &weather.recent_rainfall_mm {
        validate_rainfall(*rainfall)?;
    }
    for day in &weather.forecast {
        validate_rainfall(day.rainfall_mm)?;
        validate_temperature(day.temperature_celsius)?;
        if let Some(max) = day.temperature_max_celsius {
            validate_temperature(max)?;
        }
        validate_humidity(day.humidity_percent)?;
    }
    if weather.forecast.windows(2).any(|pair| pair[1].date <= pair[0].date) {
        return Err("Forecast days must be in ascending date order");
    }
    Ok(())
}

// ============================================================================
// Schedule Validations
// ============================================================================

/// Validate split percentages sum to 100
pub fn validate_split_fractions(fractions: &[Decimal]) -> Result<(), &'static str> {
    if fractions.iter().any(|f| *f < Decimal::ZERO) {
        return Err("Split fractions cannot be negative");
    }
    let total: Decimal = fractions.iter().sum();
    if total != Decimal::from(100) {
        return Err("Split fractions must sum to 100%");
    }
    Ok(())
}

/// Validate stage boundaries partition the lifecycle from day 0 with no
/// gaps or overlaps
pub fn validate_stage_partition(stages: &[StageBoundary]) -> Result<(), &'static str> {
    let first = stages.first().ok_or("Stage table is empty")?;
    if first.days.start != 0 {
        return Err("Stage table must start at day 0");
    }
    for stage in stages {
        if stage.days.is_empty() {
            return Err("Stage range end precedes its start");
        }
    }
    for pair in stages.windows(2) {
        if pair[1].days.start != pair[0].days.end + 1 {
            return Err("Stage ranges must be contiguous and non-overlapping");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentConditions, DailyForecast, GrowthStageKind, IrrigationMethod, SoilType};
    use crate::types::DasRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile() -> CropProfile {
        CropProfile {
            crop: "wheat".to_string(),
            sowing_date: date(2025, 11, 10),
            target_yield: Decimal::from(40),
            soil_type: SoilType::Loam,
            irrigation_method: IrrigationMethod::Canal,
            area: Decimal::from(5),
            last_irrigation_date: None,
        }
    }

    fn boundary(stage: GrowthStageKind, start: u32, end: u32) -> StageBoundary {
        StageBoundary {
            stage,
            days: DasRange::new(start, end),
        }
    }

    // ========================================================================
    // Crop Profile Validation Tests
    // ========================================================================

    #[test]
    fn test_valid_profile() {
        assert!(validate_crop_profile(&profile(), date(2025, 12, 1)).is_ok());
    }

    #[test]
    fn test_profile_sown_today_is_valid() {
        assert!(validate_crop_profile(&profile(), date(2025, 11, 10)).is_ok());
    }

    #[test]
    fn test_profile_future_sowing() {
        assert!(validate_crop_profile(&profile(), date(2025, 11, 9)).is_err());
    }

    #[test]
    fn test_profile_non_positive_area() {
        let mut p = profile();
        p.area = Decimal::ZERO;
        assert!(validate_crop_profile(&p, date(2025, 12, 1)).is_err());
    }

    #[test]
    fn test_profile_upper_bounds() {
        let mut p = profile();
        p.area = Decimal::from(MAX_AREA_ACRES);
        assert!(validate_crop_profile(&p, date(2025, 12, 1)).is_ok());
        p.area = Decimal::MAX;
        assert!(validate_crop_profile(&p, date(2025, 12, 1)).is_err());

        let mut p = profile();
        p.target_yield = Decimal::from(MAX_TARGET_YIELD + 1);
        assert_eq!(
            validate_crop_profile(&p, date(2025, 12, 1)),
            Err("Target yield cannot exceed 1000 maunds per acre")
        );
    }

    #[test]
    fn test_profile_blank_crop() {
        let mut p = profile();
        p.crop = "   ".to_string();
        assert_eq!(
            validate_crop_profile(&p, date(2025, 12, 1)),
            Err("Crop is required")
        );
    }

    #[test]
    fn test_profile_irrigation_before_sowing() {
        let mut p = profile();
        p.last_irrigation_date = Some(date(2025, 11, 1));
        assert!(validate_crop_profile(&p, date(2025, 12, 1)).is_err());
    }

    // ========================================================================
    // Weather Validation Tests
    // ========================================================================

    #[test]
    fn test_humidity_bounds() {
        assert!(validate_humidity(Decimal::ZERO).is_ok());
        assert!(validate_humidity(Decimal::from(100)).is_ok());
        assert!(validate_humidity(Decimal::from(101)).is_err());
        assert!(validate_rainfall(Decimal::from(-1)).is_err());
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            observed_on: date(2025, 12, 1),
            current: CurrentConditions {
                temperature_celsius: Decimal::from(22),
                humidity_percent: Decimal::from(70),
                wind_kph: Decimal::from(8),
                temperature_max_celsius: Some(Decimal::from(27)),
            },
            forecast: (2..=4)
                .map(|d| DailyForecast {
                    date: date(2025, 12, d),
                    rainfall_mm: Decimal::from(3),
                    temperature_celsius: Decimal::from(20),
                    temperature_max_celsius: None,
                    humidity_percent: Decimal::from(65),
                })
                .collect(),
            recent_rainfall_mm: vec![Decimal::ZERO, Decimal::from(5), Decimal::ZERO],
        }
    }

    #[test]
    fn test_weather_snapshot_valid() {
        assert!(validate_weather_snapshot(&snapshot()).is_ok());
    }

    #[test]
    fn test_weather_snapshot_rejects_bad_readings() {
        let mut w = snapshot();
        w.current.humidity_percent = Decimal::from(250);
        assert!(validate_weather_snapshot(&w).is_err());

        let mut w = snapshot();
        w.recent_rainfall_mm[0] = Decimal::from(-100);
        assert_eq!(validate_weather_snapshot(&w), Err("Rainfall cannot be negative"));

        let mut w = snapshot();
        w.forecast[1].humidity_percent = Decimal::from(-5);
        assert!(validate_weather_snapshot(&w).is_err());

        let mut w = snapshot();
        w.current.temperature_celsius = Decimal::MAX;
        assert!(validate_weather_snapshot(&w).is_err());

        let mut w = snapshot();
        w.current.wind_kph = Decimal::from(-1);
        assert!(validate_weather_snapshot(&w).is_err());
    }

    #[test]
    fn test_weather_snapshot_forecast_order() {
        let mut w = snapshot();
        w.forecast.swap(0, 2);
        assert_eq!(
            validate_weather_snapshot(&w),
            Err("Forecast days must be in ascending date order")
        );

        let mut w = snapshot();
        w.forecast[1].date = w.forecast[0].date;
        assert!(validate_weather_snapshot(&w).is_err());
    }

    // ========================================================================
    // Schedule Validation Tests
    // ========================================================================

    #[test]
    fn test_split_fractions() {
        let ok = [Decimal::from(30), Decimal::from(40), Decimal::from(30)];
        assert!(validate_split_fractions(&ok).is_ok());
        let short = [Decimal::from(30), Decimal::from(40)];
        assert!(validate_split_fractions(&short).is_err());
        let negative = [Decimal::from(110), Decimal::from(-10)];
        assert!(validate_split_fractions(&negative).is_err());
    }

    #[test]
    fn test_stage_partition() {
        let ok = [
            boundary(GrowthStageKind::Germination, 0, 14),
            boundary(GrowthStageKind::Tillering, 15, 35),
        ];
        assert!(validate_stage_partition(&ok).is_ok());

        let gap = [
            boundary(GrowthStageKind::Germination, 0, 14),
            boundary(GrowthStageKind::Tillering, 16, 35),
        ];
        assert!(validate_stage_partition(&gap).is_err());

        let overlap = [
            boundary(GrowthStageKind::Germination, 0, 14),
            boundary(GrowthStageKind::Tillering, 14, 35),
        ];
        assert!(validate_stage_partition(&overlap).is_err());

        let late_start = [boundary(GrowthStageKind::Germination, 1, 14)];
        assert!(validate_stage_partition(&late_start).is_err());
        assert!(validate_stage_partition(&[]).is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Contiguous ranges built from arbitrary stage lengths always validate
            #[test]
            fn contiguous_stages_validate(lengths in prop::collection::vec(1u32..40, 1..6)) {
                let kinds = [
                    GrowthStageKind::Germination,
                    GrowthStageKind::Tillering,
                    GrowthStageKind::Jointing,
                    GrowthStageKind::Booting,
                    GrowthStageKind::Flowering,
                ];
                let mut start = 0;
                let mut stages = Vec::new();
                for (len, kind) in lengths.iter().zip(kinds) {
                    stages.push(boundary(kind, start, start + len - 1));
                    start += len;
                }

                prop_assert!(validate_stage_partition(&stages).is_ok());
            }

            /// A split whose last share tops the others up to 100 validates
            #[test]
            fn completed_split_validates(shares in prop::collection::vec(0u32..30, 0..3)) {
                let mut split: Vec<Decimal> = shares.iter().map(|s| Decimal::from(*s)).collect();
                let rest = Decimal::from(100) - split.iter().sum::<Decimal>();
                split.push(rest);

                prop_assert!(validate_split_fractions(&split).is_ok());
            }
        }
    }
}
