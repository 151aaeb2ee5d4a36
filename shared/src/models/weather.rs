//! Weather data models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current conditions plus forecast, supplied per advisory request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    /// Date the current conditions were observed
    pub observed_on: NaiveDate,
    pub current: CurrentConditions,
    /// Daily forecast ordered by date
    #[serde(default)]
    pub forecast: Vec<DailyForecast>,
    /// Rainfall of the trailing days, most recent first
    #[serde(default)]
    pub recent_rainfall_mm: Vec<Decimal>,
}

impl WeatherSnapshot {
    /// Total rainfall over the trailing `days` days
    pub fn trailing_rainfall(&self, days: usize) -> Decimal {
        self.recent_rainfall_mm.iter().take(days).sum()
    }

    /// Total forecast rainfall between two dates, both ends included
    pub fn forecast_rainfall_between(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        self.forecast
            .iter()
            .filter(|day| day.date >= start && day.date <= end)
            .map(|day| day.rainfall_mm)
            .sum()
    }
}

/// Conditions at observation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    pub temperature_celsius: Decimal,
    pub humidity_percent: Decimal,
    pub wind_kph: Decimal,
    /// Today's expected maximum, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_max_celsius: Option<Decimal>,
}

impl CurrentConditions {
    pub fn peak_temperature(&self) -> Decimal {
        self.temperature_max_celsius.unwrap_or(self.temperature_celsius)
    }
}

/// Daily weather forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub rainfall_mm: Decimal,
    /// Mean temperature for the day
    pub temperature_celsius: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_max_celsius: Option<Decimal>,
    pub humidity_percent: Decimal,
}

impl DailyForecast {
    /// Daily maximum, falling back to the mean when no maximum was reported
    pub fn peak_temperature(&self) -> Decimal {
        self.temperature_max_celsius.unwrap_or(self.temperature_celsius)
    }
}
