//! Weather service with a per-district TTL cache
//!
//! The engine never caches weather itself; this service keeps fetched
//! snapshots for a configurable time so repeated advisories for one district
//! do not hit the provider again.

use shared::{district_coordinates, WeatherSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::external::WeatherProvider;

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: WeatherSnapshot,
    fetched_at: Instant,
}

/// Weather service for fetching snapshots by district
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    ttl: Duration,
    cache: Arc<RwLock<HashMap<String, CachedSnapshot>>>,
}

impl WeatherService {
    /// Create a new WeatherService around a provider
    pub fn new(provider: Arc<dyn WeatherProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot for a district, served from cache while fresh
    pub async fn snapshot_for_district(&self, district: &str) -> AppResult<WeatherSnapshot> {
        let coordinates = district_coordinates(district)
            .ok_or_else(|| AppError::UnknownDistrict(district.trim().to_string()))?;
        let key = district.trim().to_lowercase();

        if let Some(cached) = self.cache.read().await.get(&key) {
            if cached.fetched_at.elapsed() < self.ttl {
                tracing::debug!(district = %key, "Weather cache hit");
                return Ok(cached.snapshot.clone());
            }
        }

        let snapshot = self.provider.snapshot(coordinates).await?;
        tracing::info!(district = %key, observed_on = %snapshot.observed_on, "Fetched weather snapshot");

        self.cache.write().await.insert(
            key,
            CachedSnapshot {
                snapshot: snapshot.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(snapshot)
    }

    /// Number of districts currently cached, fresh or stale
    pub async fn cached_districts(&self) -> usize {
        self.cache.read().await.len()
    }
}
