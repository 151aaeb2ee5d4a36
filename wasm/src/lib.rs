//! WebAssembly module for the Agronomic Advisory Platform
//!
//! Runs the advisory engine client-side against the built-in knowledge base
//! so farmers get fertilizer, irrigation and risk advice while offline.
//! Inputs and outputs are JSON strings in the shared model's wire format.

use chrono::NaiveDate;
use engine::{
    days_after_sowing, Advisor, AdvisoryOptions, EngineError, FertilizerPlanner, GrowthStageResolver,
    IrrigationPlanner, KnowledgeBase, RiskAssessor,
};
use shared::{CropProfile, GrowthStage, RetrievalHit, WeatherSnapshot};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;

fn engine_error(err: EngineError) -> String {
    format!("{}: {}", err.code(), err)
}

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn parse_date(as_of: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(as_of, "%Y-%m-%d").map_err(|e| format!("Invalid date {}: {}", as_of, e))
}

fn parse_weather(json: &str) -> Result<WeatherSnapshot, String> {
    let weather: WeatherSnapshot = parse(json, "weather")?;
    shared::validate_weather_snapshot(&weather).map_err(|e| engine_error(e.into()))?;
    Ok(weather)
}

fn prepare(kb: &KnowledgeBase, profile_json: &str, as_of: &str) -> Result<(CropProfile, GrowthStage), String> {
    let profile: CropProfile = parse(profile_json, "profile")?;
    let as_of = parse_date(as_of)?;
    shared::validate_crop_profile(&profile, as_of).map_err(|e| engine_error(e.into()))?;
    let das = days_after_sowing(profile.sowing_date, as_of).map_err(engine_error)?;
    let stage = GrowthStageResolver::new(kb)
        .resolve(&profile.crop, das)
        .map_err(engine_error)?;
    Ok((profile, stage))
}

pub fn resolve_growth_stage_json(crop: &str, das: u32) -> Result<String, String> {
    let kb = KnowledgeBase::builtin();
    let stage = GrowthStageResolver::new(&kb).resolve(crop, das).map_err(engine_error)?;
    to_json(&stage)
}

pub fn plan_fertilizer_json(profile_json: &str, as_of: &str, weather_json: Option<&str>) -> Result<String, String> {
    let kb = KnowledgeBase::builtin();
    let (profile, stage) = prepare(&kb, profile_json, as_of)?;
    let weather = weather_json.map(parse_weather).transpose()?;
    let plan = FertilizerPlanner::new(&kb)
        .plan(&profile, &stage, weather.as_ref())
        .map_err(engine_error)?;
    to_json(&plan)
}

pub fn plan_irrigation_json(profile_json: &str, as_of: &str, weather_json: &str) -> Result<String, String> {
    let kb = KnowledgeBase::builtin();
    let (profile, stage) = prepare(&kb, profile_json, as_of)?;
    let weather = parse_weather(weather_json)?;
    let plan = IrrigationPlanner::new(&kb)
        .plan(&profile, &stage, &weather)
        .map_err(engine_error)?;
    to_json(&plan)
}

pub fn assess_risk_json(
    profile_json: &str,
    as_of: &str,
    weather_json: &str,
    hits_json: Option<&str>,
) -> Result<String, String> {
    let kb = KnowledgeBase::builtin();
    let (profile, stage) = prepare(&kb, profile_json, as_of)?;
    let weather = parse_weather(weather_json)?;
    let hits: Vec<RetrievalHit> = hits_json.map(|h| parse(h, "retrieval hits")).transpose()?.unwrap_or_default();
    let assessment = RiskAssessor::new(&kb)
        .assess(&profile, &stage, &weather, &hits)
        .map_err(engine_error)?;
    to_json(&assessment)
}

/// Offline advisory; without weather it degrades to a fertilizer-only result
pub fn advise_json(profile_json: &str, as_of: &str, weather_json: Option<&str>) -> Result<String, String> {
    let kb = KnowledgeBase::builtin();
    let profile: CropProfile = parse(profile_json, "profile")?;
    let weather = weather_json.map(parse_weather).transpose()?;
    let options = AdvisoryOptions {
        degrade_without_weather: true,
        ..AdvisoryOptions::default()
    };
    let result = Advisor::new(&kb, options)
        .advise(&profile, parse_date(as_of)?, weather.as_ref(), &[])
        .map_err(engine_error)?;
    to_json(&result)
}

// ============================================================================
// JavaScript bindings
// ============================================================================

fn to_js(result: Result<String, String>) -> Result<String, JsValue> {
    result.map_err(|message| {
        web_sys::console::error_1(&JsValue::from_str(&message));
        JsValue::from_str(&message)
    })
}

/// Today's local date from the browser clock, as YYYY-MM-DD
fn today() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

#[wasm_bindgen]
pub fn resolve_growth_stage(crop: &str, das: u32) -> Result<String, JsValue> {
    to_js(resolve_growth_stage_json(crop, das))
}

#[wasm_bindgen]
pub fn plan_fertilizer(
    profile_json: &str,
    as_of: Option<String>,
    weather_json: Option<String>,
) -> Result<String, JsValue> {
    let as_of = as_of.unwrap_or_else(today);
    to_js(plan_fertilizer_json(profile_json, &as_of, weather_json.as_deref()))
}

#[wasm_bindgen]
pub fn plan_irrigation(profile_json: &str, as_of: Option<String>, weather_json: &str) -> Result<String, JsValue> {
    let as_of = as_of.unwrap_or_else(today);
    to_js(plan_irrigation_json(profile_json, &as_of, weather_json))
}

#[wasm_bindgen]
pub fn assess_risk(
    profile_json: &str,
    as_of: Option<String>,
    weather_json: &str,
    hits_json: Option<String>,
) -> Result<String, JsValue> {
    let as_of = as_of.unwrap_or_else(today);
    to_js(assess_risk_json(profile_json, &as_of, weather_json, hits_json.as_deref()))
}

#[wasm_bindgen]
pub fn advise(profile_json: &str, as_of: Option<String>, weather_json: Option<String>) -> Result<String, JsValue> {
    let as_of = as_of.unwrap_or_else(today);
    to_js(advise_json(profile_json, &as_of, weather_json.as_deref()))
}
