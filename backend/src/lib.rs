//! Agronomic Advisory Platform - HTTP server
//!
//! Serves fertilizer, irrigation and crop risk advisories for farmers,
//! fetching weather and retrieval context for the advisory engine.

use axum::{routing::get, Router};
use engine::SharedKnowledge;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use external::RetrievalProvider;
use services::WeatherService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub knowledge: Arc<SharedKnowledge>,
    pub weather: WeatherService,
    pub retrieval: Option<Arc<dyn RetrievalProvider>>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Agronomic Advisory Platform API v1.0"
}
