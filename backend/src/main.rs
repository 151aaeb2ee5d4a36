//! Agronomic Advisory Platform - Backend Server

use agro_server::{
    config::Config,
    create_app,
    external::{HttpRetrievalClient, OpenMeteoClient, RetrievalProvider},
    services::WeatherService,
    AppState,
};
use engine::{KnowledgeBase, SharedKnowledge};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agro_server=debug,engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Agronomic Advisory Server");
    tracing::info!("Environment: {}", config.environment);

    let knowledge = match &config.knowledge.path {
        Some(path) => KnowledgeBase::load(path)?,
        None => {
            tracing::info!("Using built-in knowledge base");
            KnowledgeBase::builtin()
        }
    };

    let weather_client = OpenMeteoClient::new(
        config.weather.api_endpoint.clone(),
        Duration::from_secs(config.weather.timeout_seconds),
        config.weather.forecast_days,
    )?;

    let retrieval = match &config.retrieval.endpoint {
        Some(endpoint) => {
            tracing::info!("Retrieval enabled: {}", endpoint);
            let client = HttpRetrievalClient::new(
                endpoint.clone(),
                Duration::from_secs(config.retrieval.timeout_seconds),
            )?;
            Some(Arc::new(client) as Arc<dyn RetrievalProvider>)
        }
        None => None,
    };

    // Create application state
    let state = AppState {
        knowledge: Arc::new(SharedKnowledge::new(knowledge)),
        weather: WeatherService::new(
            Arc::new(weather_client),
            Duration::from_secs(config.weather.cache_ttl_seconds),
        ),
        retrieval,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
