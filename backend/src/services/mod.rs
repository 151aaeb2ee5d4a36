//! Services wiring the advisory engine to its external collaborators

pub mod advisory;
pub mod knowledge;
pub mod weather;

pub use advisory::AdvisoryService;
pub use knowledge::KnowledgeService;
pub use weather::WeatherService;
