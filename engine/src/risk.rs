//! Disease and climate risk assessment
//!
//! Rules are scored on the weighted share of their declared condition
//! classes that hold (stage, days after sowing, and temperature or humidity
//! when the rule sets a threshold for them). Externally retrieved
//! hits are merged by risk id, with rules authoritative when both sources
//! name the same risk, then everything is ranked.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::{
    ConditionClass, CropProfile, GrowthStage, PriorityAction, RetrievalHit, RiskAssessment,
    RiskCategory, RiskFinding, RiskLevel, RiskSource, WeatherSnapshot,
};
use shared::validate_weather_snapshot;

use crate::error::EngineResult;
use crate::knowledge::{KnowledgeBase, RiskRule, RiskScoring};

/// Default number of priority actions
pub const DEFAULT_PRIORITY_ACTIONS: usize = 3;

/// Scores risk rules and merges retrieval hits
#[derive(Debug, Clone, Copy)]
pub struct RiskAssessor<'a> {
    kb: &'a KnowledgeBase,
    priority_actions: usize,
}

impl<'a> RiskAssessor<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            priority_actions: DEFAULT_PRIORITY_ACTIONS,
        }
    }

    /// Number of findings promoted to priority actions
    pub fn with_priority_actions(mut self, count: usize) -> Self {
        self.priority_actions = count;
        self
    }

    pub fn assess(
        &self,
        profile: &CropProfile,
        stage: &GrowthStage,
        weather: &WeatherSnapshot,
        retrieval_hits: &[RetrievalHit],
    ) -> EngineResult<RiskAssessment> {
        validate_weather_snapshot(weather)?;
        let crop = self.kb.crop(&profile.crop)?;
        let scoring = &self.kb.risk_scoring;

        // Phase 1: rule matching
        let mut merged: BTreeMap<String, RiskFinding> = BTreeMap::new();
        for rule in &crop.risks {
            let matched = matched_conditions(rule, stage, weather);
            let score = match_score(scoring, rule, &matched);
            if score < scoring.min_score {
                continue;
            }
            tracing::debug!(risk = %rule.id, %score, ?matched, "Risk rule matched");
            merged.insert(rule.id.clone(), finding(rule, score, RiskSource::Rule, matched));
        }

        // Phase 2: merge retrieval hits
        for hit in retrieval_hits {
            let Some(rule) = crop.risk(&hit.risk_id) else {
                tracing::warn!(risk = %hit.risk_id, crop = %crop.name, "Dropping retrieval hit for unknown risk");
                continue;
            };
            let score = (hit.relevance.clamp(Decimal::ZERO, Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2);
            match merged.get_mut(&rule.id) {
                // Higher score wins; a rule finding keeps its Rule source
                Some(existing) => existing.score = existing.score.max(score),
                None => {
                    merged.insert(rule.id.clone(), finding(rule, score, RiskSource::Retrieval, Vec::new()));
                }
            }
        }

        // Phase 3: rank
        let mut ranked: Vec<RiskFinding> = merged.into_values().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

        let priority_actions = ranked
            .iter()
            .take(self.priority_actions)
            .map(|f| PriorityAction {
                risk_id: f.id.clone(),
                name: f.name.clone(),
                category: f.category,
                score: f.score,
                action: f.action.clone(),
            })
            .collect();

        let (disease, climate): (Vec<_>, Vec<_>) =
            ranked.into_iter().partition(|f| f.category == RiskCategory::Disease);

        Ok(RiskAssessment {
            disease_level: overall_level(&disease),
            climate_level: overall_level(&climate),
            disease,
            climate,
            priority_actions,
        })
    }
}

/// Declared condition classes of `rule` satisfied right now. Temperature
/// and humidity only count when the rule sets a threshold for them.
pub fn matched_conditions(rule: &RiskRule, stage: &GrowthStage, weather: &WeatherSnapshot) -> Vec<ConditionClass> {
    let mut matched = Vec::with_capacity(4);
    if rule.stages.contains(&stage.stage) {
        matched.push(ConditionClass::Stage);
    }
    if rule.days.contains(stage.days_after_sowing) {
        matched.push(ConditionClass::DaysAfterSowing);
    }
    if rule.temperature.is_declared() && rule.temperature.is_satisfied_by(weather.current.temperature_celsius) {
        matched.push(ConditionClass::Temperature);
    }
    if rule.humidity.is_declared() && rule.humidity.is_satisfied_by(weather.current.humidity_percent) {
        matched.push(ConditionClass::Humidity);
    }
    matched
}

/// Matched weight over the weight of the rule's declared classes, in [0, 100]
pub fn match_score(scoring: &RiskScoring, rule: &RiskRule, matched: &[ConditionClass]) -> Decimal {
    let weight = |class: &ConditionClass| match class {
        ConditionClass::Stage => scoring.stage_weight,
        ConditionClass::DaysAfterSowing => scoring.das_weight,
        ConditionClass::Temperature => scoring.temperature_weight,
        ConditionClass::Humidity => scoring.humidity_weight,
    };

    let mut declared = scoring.stage_weight + scoring.das_weight;
    if rule.temperature.is_declared() {
        declared += scoring.temperature_weight;
    }
    if rule.humidity.is_declared() {
        declared += scoring.humidity_weight;
    }
    if declared <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let earned: Decimal = matched.iter().map(weight).sum();
    (earned / declared * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

fn finding(rule: &RiskRule, score: Decimal, source: RiskSource, matched: Vec<ConditionClass>) -> RiskFinding {
    RiskFinding {
        category: rule.category,
        id: rule.id.clone(),
        name: rule.name.clone(),
        severity: rule.severity,
        score,
        action: rule.action.clone(),
        source,
        matched,
    }
}

/// Level implied by the highest score; findings are already ranked
fn overall_level(findings: &[RiskFinding]) -> RiskLevel {
    findings
        .first()
        .map(|f| RiskLevel::from_score(f.score))
        .unwrap_or(RiskLevel::Low)
}
