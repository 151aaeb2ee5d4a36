//! Configuration management for the advisory server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AGRO_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Semantic retrieval configuration
    pub retrieval: RetrievalConfig,

    /// Knowledge base source
    pub knowledge: KnowledgeConfig,

    /// Advisory behaviour
    pub advisory: AdvisoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    pub api_endpoint: String,

    /// How long a fetched snapshot is reused per district
    pub cache_ttl_seconds: u64,

    pub timeout_seconds: u64,

    /// Serve fertilizer-only advisories when weather cannot be fetched
    pub degrade_gracefully: bool,

    /// Days of forecast requested after today
    pub forecast_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Semantic search endpoint; retrieval is disabled when unset
    pub endpoint: Option<String>,

    pub timeout_seconds: u64,

    /// Maximum hits requested per assessment
    pub max_hits: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KnowledgeConfig {
    /// JSON knowledge base overriding the built-in tables
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisoryConfig {
    /// Number of priority actions returned with each risk assessment
    pub priority_actions: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.api_endpoint", "https://api.open-meteo.com/v1/forecast")?
            .set_default("weather.cache_ttl_seconds", 900)?
            .set_default("weather.timeout_seconds", 10)?
            .set_default("weather.degrade_gracefully", false)?
            .set_default("weather.forecast_days", 7)?
            .set_default("retrieval.timeout_seconds", 5)?
            .set_default("retrieval.max_hits", 5)?
            .set_default("advisory.priority_actions", 3)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO_ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            weather: WeatherConfig::default(),
            retrieval: RetrievalConfig::default(),
            knowledge: KnowledgeConfig::default(),
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.open-meteo.com/v1/forecast".to_string(),
            cache_ttl_seconds: 900,
            timeout_seconds: 10,
            degrade_gracefully: false,
            forecast_days: 7,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_seconds: 5,
            max_hits: 5,
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self { priority_actions: 3 }
    }
}
