//! Weather API client for fetching weather data
//!
//! Integrates with the Open-Meteo forecast API for current conditions, the
//! daily forecast and the trailing days of observed rainfall.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_weather_snapshot, CurrentConditions, DailyForecast, GpsCoordinates, WeatherSnapshot};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Days of observed rainfall requested alongside the forecast
const PAST_DAYS: u32 = 3;

/// Source of weather snapshots for the advisory engine
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn snapshot(&self, location: GpsCoordinates) -> AppResult<WeatherSnapshot>;
}

/// Open-Meteo API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    forecast_days: u32,
}

/// Open-Meteo forecast response
#[derive(Debug, Deserialize)]
pub struct OpenMeteoResponse {
    pub current: OpenMeteoCurrent,
    pub daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
pub struct OpenMeteoCurrent {
    /// Local time, e.g. "2025-11-21T10:15"
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub wind_speed_10m: f64,
}

/// Column-oriented daily values; missing observations arrive as null
#[derive(Debug, Deserialize)]
pub struct OpenMeteoDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_mean: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub relative_humidity_2m_mean: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    /// Create a new OpenMeteoClient
    pub fn new(base_url: String, timeout: Duration, forecast_days: u32) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build weather client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            forecast_days,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn snapshot(&self, location: GpsCoordinates) -> AppResult<WeatherSnapshot> {
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,wind_speed_10m".to_string(),
            ),
            (
                "daily",
                "temperature_2m_max,temperature_2m_mean,precipitation_sum,relative_humidity_2m_mean"
                    .to_string(),
            ),
            ("past_days", PAST_DAYS.to_string()),
            // Today counts as one of the forecast days
            ("forecast_days", (self.forecast_days + 1).to_string()),
            ("timezone", "auto".to_string()),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::WeatherUnavailable(format!("Weather API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WeatherUnavailable(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let data: OpenMeteoResponse = response.json().await.map_err(|e| {
            AppError::WeatherUnavailable(format!("Failed to parse weather response: {}", e))
        })?;

        snapshot_from_response(data)
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(2))
}

fn parse_day(time: &str) -> AppResult<NaiveDate> {
    time.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::WeatherUnavailable(format!("Unparseable weather date: {}", time)))
}

fn required(value: f64, name: &str) -> AppResult<Decimal> {
    to_decimal(value).ok_or_else(|| AppError::WeatherUnavailable(format!("Invalid {} value", name)))
}

/// Convert an Open-Meteo response into an engine weather snapshot.
///
/// Days before today feed the trailing rainfall (most recent first), today
/// supplies the current maximum temperature and later days form the forecast.
/// Forecast days missing temperature or humidity are skipped.
pub fn snapshot_from_response(data: OpenMeteoResponse) -> AppResult<WeatherSnapshot> {
    let today = parse_day(&data.current.time)?;
    let daily = &data.daily;
    let column = |values: &Vec<Option<f64>>, i: usize| values.get(i).copied().flatten().and_then(to_decimal);

    let mut recent_rainfall_mm = Vec::new();
    let mut forecast = Vec::new();
    let mut temperature_max_celsius = None;

    for (i, time) in daily.time.iter().enumerate() {
        let date = parse_day(time)?;
        let rainfall_mm = column(&daily.precipitation_sum, i).unwrap_or(Decimal::ZERO);
        let temperature_max = column(&daily.temperature_2m_max, i);

        if date < today {
            recent_rainfall_mm.push(rainfall_mm);
        } else if date == today {
            temperature_max_celsius = temperature_max;
        } else {
            let (Some(temperature_celsius), Some(humidity_percent)) = (
                column(&daily.temperature_2m_mean, i),
                column(&daily.relative_humidity_2m_mean, i),
            ) else {
                tracing::debug!(%date, "Skipping incomplete forecast day");
                continue;
            };
            forecast.push(DailyForecast {
                date,
                rainfall_mm,
                temperature_celsius,
                temperature_max_celsius: temperature_max,
                humidity_percent,
            });
        }
    }
    recent_rainfall_mm.reverse();

    let snapshot = WeatherSnapshot {
        observed_on: today,
        current: CurrentConditions {
            temperature_celsius: required(data.current.temperature_2m, "temperature")?,
            humidity_percent: required(data.current.relative_humidity_2m, "humidity")?,
            wind_kph: required(data.current.wind_speed_10m, "wind speed")?,
            temperature_max_celsius,
        },
        forecast,
        recent_rainfall_mm,
    };
    validate_weather_snapshot(&snapshot)
        .map_err(|reason| AppError::WeatherUnavailable(format!("Implausible weather data: {}", reason)))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    const RESPONSE: &str = r#"{
        "current": {
            "time": "2025-11-21T10:15",
            "temperature_2m": 21.4,
            "relative_humidity_2m": 68,
            "wind_speed_10m": 7.9
        },
        "daily": {
            "time": ["2025-11-18", "2025-11-19", "2025-11-20", "2025-11-21", "2025-11-22", "2025-11-23"],
            "temperature_2m_max": [24.0, 25.1, 23.2, 26.5, 27.0, null],
            "temperature_2m_mean": [18.0, 19.0, 17.5, 20.0, 21.0, 20.5],
            "precipitation_sum": [0.0, 4.2, 1.1, 0.0, 12.5, null],
            "relative_humidity_2m_mean": [60, 62, 70, 65, 78, null]
        }
    }"#;

    #[test]
    fn response_splits_past_today_and_forecast() {
        let data: OpenMeteoResponse = serde_json::from_str(RESPONSE).unwrap();
        let snapshot = snapshot_from_response(data).unwrap();

        assert_eq!(snapshot.observed_on, NaiveDate::from_ymd_opt(2025, 11, 21).unwrap());
        assert_eq!(snapshot.current.temperature_celsius, dec("21.4"));
        assert_eq!(snapshot.current.temperature_max_celsius, Some(dec("26.5")));
        assert_eq!(snapshot.recent_rainfall_mm, vec![dec("1.1"), dec("4.2"), Decimal::ZERO]);

        // The last day lacks humidity and is skipped
        assert_eq!(snapshot.forecast.len(), 1);
        assert_eq!(snapshot.forecast[0].rainfall_mm, dec("12.5"));
        assert_eq!(snapshot.forecast[0].temperature_max_celsius, Some(dec("27")));
    }

    #[test]
    fn implausible_response_is_unavailable() {
        let mut data: OpenMeteoResponse = serde_json::from_str(RESPONSE).unwrap();
        data.current.relative_humidity_2m = 250.0;
        assert!(matches!(snapshot_from_response(data), Err(AppError::WeatherUnavailable(_))));

        let mut data: OpenMeteoResponse = serde_json::from_str(RESPONSE).unwrap();
        data.daily.precipitation_sum[1] = Some(-4.0);
        assert!(matches!(snapshot_from_response(data), Err(AppError::WeatherUnavailable(_))));
    }
}
