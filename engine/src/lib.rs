//! Agronomic Advisory Engine
//!
//! Turns a farmer's crop profile and a weather snapshot into a fertilizer
//! schedule, an irrigation schedule and a disease/climate risk assessment.
//! Every component is a synchronous, deterministic function of its inputs
//! and an immutable [`KnowledgeBase`].

pub mod advisory;
mod builtin;
pub mod error;
pub mod fertilizer;
pub mod growth_stage;
pub mod irrigation;
pub mod knowledge;
pub mod risk;

pub use advisory::{Advisor, AdvisoryOptions};
pub use error::{EngineError, EngineResult};
pub use fertilizer::FertilizerPlanner;
pub use growth_stage::{days_after_sowing, GrowthStageResolver};
pub use irrigation::IrrigationPlanner;
pub use knowledge::{KnowledgeBase, SharedKnowledge};
pub use risk::RiskAssessor;
