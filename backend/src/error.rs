//! Error handling for the advisory server
//!
//! Provides consistent error responses in English and Urdu

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::EngineError;
use serde::Serialize;
use shared::supported_districts;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ur: String,
    },

    #[error("Unknown district: {0}")]
    UnknownDistrict(String),

    // Engine errors surface unmodified
    #[error(transparent)]
    Engine(#[from] EngineError),

    // External service errors
    #[error("Weather service unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ur: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        let message = errors.to_string();
        AppError::Validation {
            message_ur: format!("درج کردہ معلومات درست نہیں: {}", field),
            field,
            message,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message, message_ur } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_ur: message_ur.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::UnknownDistrict(district) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "UNKNOWN_DISTRICT".to_string(),
                    message_en: format!(
                        "Coordinates not defined for district: {}. Supported districts: {}",
                        district,
                        supported_districts().join(", ")
                    ),
                    message_ur: format!("ضلع {} کے لیے موسم کی معلومات دستیاب نہیں", district),
                    field: Some("district".to_string()),
                },
            ),
            AppError::Engine(err) => engine_error_detail(err),
            AppError::WeatherUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "WEATHER_UNAVAILABLE".to_string(),
                    message_en: "Weather service is temporarily unavailable".to_string(),
                    message_ur: "موسم کی معلومات عارضی طور پر دستیاب نہیں".to_string(),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_ur: "سرور کی ترتیبات میں خرابی ہے".to_string(),
                    field: None,
                },
            ),
        }
    }
}

fn engine_error_detail(err: &EngineError) -> (StatusCode, ErrorDetail) {
    let (status, message_ur, field) = match err {
        EngineError::UnknownCrop(crop) => (
            StatusCode::NOT_FOUND,
            format!("فصل {} کے بارے میں معلومات دستیاب نہیں", crop),
            Some("crop"),
        ),
        EngineError::OutOfRange { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "فصل کی مدت مکمل ہو چکی ہے، کٹائی کا وقت گزر چکا ہے".to_string(),
            None,
        ),
        EngineError::DataIntegrity(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "زرعی معلومات کے ذخیرے میں خرابی ہے".to_string(),
            None,
        ),
        EngineError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "موسم کی معلومات عارضی طور پر دستیاب نہیں".to_string(),
            None,
        ),
        EngineError::InvalidInput(msg) => (
            StatusCode::BAD_REQUEST,
            format!("درج کردہ معلومات درست نہیں: {}", msg),
            None,
        ),
    };

    (
        status,
        ErrorDetail {
            code: err.code().to_string(),
            message_en: err.to_string(),
            message_ur,
            field: field.map(str::to_string),
        },
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
