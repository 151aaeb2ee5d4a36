//! Disease and climate risk models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Disease,
    Climate,
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskCategory::Disease => write!(f, "Disease"),
            RiskCategory::Climate => write!(f, "Climate"),
        }
    }
}

/// Origin of a finding. Rule findings win when both sources agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskSource {
    Rule,
    Retrieval,
}

/// Low/Medium/High, used for rule severity and overall category level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Level implied by a [0, 100] score
    pub fn from_score(score: Decimal) -> Self {
        if score >= Decimal::from(70) {
            RiskLevel::High
        } else if score >= Decimal::from(40) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Condition classes a risk rule is scored on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConditionClass {
    Stage,
    DaysAfterSowing,
    Temperature,
    Humidity,
}

/// Candidate finding produced by an external semantic search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalHit {
    pub risk_id: String,
    /// Relevance in [0, 1]
    pub relevance: Decimal,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskFinding {
    pub category: RiskCategory,
    pub id: String,
    pub name: String,
    pub severity: RiskLevel,
    /// Match score in [0, 100]
    pub score: Decimal,
    pub action: String,
    pub source: RiskSource,
    /// Condition classes the rule satisfied; empty for retrieval findings
    #[serde(default)]
    pub matched: Vec<ConditionClass>,
}

/// Top-ranked action across both categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityAction {
    pub risk_id: String,
    pub name: String,
    pub category: RiskCategory,
    pub score: Decimal,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskAssessment {
    /// Disease findings, highest score first
    pub disease: Vec<RiskFinding>,
    /// Climate findings, highest score first
    pub climate: Vec<RiskFinding>,
    pub disease_level: RiskLevel,
    pub climate_level: RiskLevel,
    pub priority_actions: Vec<PriorityAction>,
}

impl RiskAssessment {
    pub fn find(&self, id: &str) -> Option<&RiskFinding> {
        self.disease.iter().chain(self.climate.iter()).find(|f| f.id == id)
    }
}
