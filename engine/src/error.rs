//! Engine error types

use thiserror::Error;

/// Errors surfaced by the advisory engine. None of them are retryable:
/// they describe bad input or bad reference data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    #[error("Day {das} after sowing is beyond the {crop} lifecycle (ends at day {lifecycle_end})")]
    OutOfRange {
        crop: String,
        das: u32,
        lifecycle_end: u32,
    },

    #[error("Knowledge base integrity error: {0}")]
    DataIntegrity(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownCrop(_) => "UNKNOWN_CROP",
            EngineError::OutOfRange { .. } => "OUT_OF_RANGE",
            EngineError::DataIntegrity(_) => "DATA_INTEGRITY",
            EngineError::Unavailable(_) => "UNAVAILABLE",
            EngineError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

impl From<&'static str> for EngineError {
    fn from(message: &'static str) -> Self {
        EngineError::InvalidInput(message.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
