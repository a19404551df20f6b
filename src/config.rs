//! Configuration management for the soilmatch service.
//!
//! This module provides configuration handling via environment variables with sensible defaults.
//! All configuration parameters can be customized through environment variables with the
//! SOILMATCH_ prefix; any variable left unset keeps its default.
//!
//! # Environment Variables
//! - SOILMATCH_PREFILTER_RADIUS_KM: Straight-line prefilter radius (default: 200)
//! - SOILMATCH_PREFILTER_LIMIT: Candidates kept for road-distance lookups (default: 10)
//! - SOILMATCH_MAX_ROAD_DISTANCE_KM: Road-distance cutoff (default: 500)
//! - SOILMATCH_TOP_K: Rows returned per ranking (default: 3)
//! - SOILMATCH_CACHE_ENABLED: Enables the result cache (default: true)
//! - SOILMATCH_CACHE_DURATION_SECS: Cache entry lifetime (default: 3600)
//! - SOILMATCH_CACHE_SIZE: Maximum cache entries (default: 100)
//! - SOILMATCH_DISTANCE_TIMEOUT_MS: Timeout for distance/geocoding calls (default: 5000)
//! - SOILMATCH_REPOSITORY_TIMEOUT_MS: Timeout for remote table requests (default: 10000)
//! - SOILMATCH_KAKAO_REST_API_KEY: Enables the Kakao distance provider
//! - SOILMATCH_SUPABASE_URL / SOILMATCH_SUPABASE_KEY: Remote candidate table
//! - SOILMATCH_DATA_PATH: JSON file of candidate records

use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::models::GeoPoint;

/// Prefix for all soilmatch environment variables.
const ENV_PREFIX: &str = "SOILMATCH_";

/// Configuration parameters for the matching service.
///
/// This struct holds all configurable parameters that affect:
/// - Candidate filtering and ranking
/// - Result cache sizing and lifetime
/// - External provider timeouts and fallbacks
/// - Candidate sources
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Straight-line radius of the cheap prefilter, in km.
    pub prefilter_radius_km: f64,

    /// Maximum number of prefilter survivors that get a road-distance lookup.
    pub prefilter_limit: usize,

    /// Candidates whose road distance exceeds this are dropped, in km.
    pub max_road_distance_km: f64,

    /// Number of ranked rows returned.
    pub top_k: usize,

    /// Multiplier applied to straight-line distance when no road distance is available.
    pub road_factor: f64,

    /// Haulage price per ton per km.
    pub cost_per_ton_km: f64,

    /// Assumed soil density in tons per m³.
    pub soil_density_t_per_m3: f64,

    /// A narrowed repository query returning fewer rows than this triggers a full load.
    pub min_query_rows: usize,

    /// Row limit passed to narrowed repository queries.
    pub query_limit: usize,

    /// Enables the result cache. When false, lookups always miss and stores are dropped.
    pub cache_enabled: bool,

    /// Lifetime of a cache entry, in seconds.
    pub cache_duration_secs: u64,

    /// Maximum number of cache entries.
    pub cache_size: usize,

    /// Timeout for a single call to the distance/geocoding provider, in milliseconds.
    pub distance_timeout_ms: u64,

    /// Timeout for a single request to the remote candidate table, in milliseconds.
    pub repository_timeout_ms: u64,

    /// Coordinate used when a region cannot be geocoded or a record has no position.
    pub default_lat: f64,
    pub default_lon: f64,

    /// REST key for the Kakao local/mobility APIs. The offline provider is used when unset.
    pub kakao_rest_api_key: Option<String>,

    /// Base URLs of the Kakao APIs. Overridable for testing.
    pub kakao_local_url: String,
    pub kakao_navi_url: String,

    /// Remote candidate table.
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,

    /// JSON file with candidate records.
    pub data_path: Option<String>,
}

impl MatchingConfig {
    /// Attempts to load configuration from environment variables.
    ///
    /// # Environment Variables
    /// All variables must be prefixed with "SOILMATCH_". For example:
    /// - SOILMATCH_CACHE_SIZE=200
    /// - SOILMATCH_PREFILTER_LIMIT=20
    ///
    /// # Returns
    /// - Ok(config) if every present variable parses and the result validates
    /// - Err(message) if any variable is invalid
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists for local development
        dotenv::dotenv().ok();

        let env_vars: std::collections::HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .map(|(k, v)| (k.trim_start_matches(ENV_PREFIX).to_string(), v))
            .collect();

        match envy::from_iter::<_, Self>(env_vars) {
            Ok(config) => {
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(format!("Failed to parse environment variables: {}", e)),
        }
    }

    /// Loads configuration from environment variables, falling back to defaults
    /// if the environment is invalid.
    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            log::warn!("Invalid configuration, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn default_point(&self) -> GeoPoint {
        GeoPoint::new(self.default_lat, self.default_lon)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn distance_timeout(&self) -> Duration {
        Duration::from_millis(self.distance_timeout_ms)
    }

    pub fn repository_timeout(&self) -> Duration {
        Duration::from_millis(self.repository_timeout_ms)
    }

    /// Validates all configuration parameters.
    ///
    /// # Validation Rules
    /// - Distances, factors and prices must be positive
    /// - Limits and cache size must be positive
    /// - The default coordinate must be a valid position
    ///
    /// # Returns
    /// - Ok(()) if all validation passes
    /// - Err(message) with description of the first validation failure
    pub fn validate(&self) -> Result<(), String> {
        if self.prefilter_radius_km <= 0.0 {
            return Err("prefilter_radius_km must be positive".to_string());
        }
        if self.prefilter_limit == 0 {
            return Err("prefilter_limit must be positive".to_string());
        }
        if self.max_road_distance_km <= 0.0 {
            return Err("max_road_distance_km must be positive".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be positive".to_string());
        }
        if self.road_factor < 1.0 {
            return Err("road_factor must be at least 1.0".to_string());
        }
        if self.cost_per_ton_km < 0.0 || self.soil_density_t_per_m3 <= 0.0 {
            return Err(
                "cost_per_ton_km must be non-negative and soil density positive".to_string(),
            );
        }
        if self.query_limit == 0 {
            return Err("query_limit must be positive".to_string());
        }
        if self.cache_size == 0 {
            return Err("cache_size must be positive".to_string());
        }
        if self.distance_timeout_ms == 0 || self.repository_timeout_ms == 0 {
            return Err(
                "distance_timeout_ms and repository_timeout_ms must be positive".to_string(),
            );
        }
        if !self.default_point().is_valid() {
            return Err("default_lat/default_lon must be a valid coordinate".to_string());
        }
        Ok(())
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

// Credentials are never printed; the startup log dumps the whole config.
impl fmt::Debug for MatchingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchingConfig")
            .field("prefilter_radius_km", &self.prefilter_radius_km)
            .field("prefilter_limit", &self.prefilter_limit)
            .field("max_road_distance_km", &self.max_road_distance_km)
            .field("top_k", &self.top_k)
            .field("road_factor", &self.road_factor)
            .field("cost_per_ton_km", &self.cost_per_ton_km)
            .field("soil_density_t_per_m3", &self.soil_density_t_per_m3)
            .field("min_query_rows", &self.min_query_rows)
            .field("query_limit", &self.query_limit)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_duration_secs", &self.cache_duration_secs)
            .field("cache_size", &self.cache_size)
            .field("distance_timeout_ms", &self.distance_timeout_ms)
            .field("repository_timeout_ms", &self.repository_timeout_ms)
            .field("default_lat", &self.default_lat)
            .field("default_lon", &self.default_lon)
            .field("kakao_rest_api_key", &redact(&self.kakao_rest_api_key))
            .field("kakao_local_url", &self.kakao_local_url)
            .field("kakao_navi_url", &self.kakao_navi_url)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("data_path", &self.data_path)
            .finish()
    }
}

/// Default configuration values.
impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            prefilter_radius_km: 200.0,
            prefilter_limit: 10,
            max_road_distance_km: 500.0,
            top_k: 3,
            road_factor: 1.4,
            cost_per_ton_km: 123.0,
            soil_density_t_per_m3: 1.5,
            min_query_rows: 1,
            query_limit: 50,
            cache_enabled: true,
            cache_duration_secs: 3600,
            cache_size: 100,
            distance_timeout_ms: 5000,
            repository_timeout_ms: 10_000,
            default_lat: 37.5665,     // Seoul City Hall
            default_lon: 126.9780,
            kakao_rest_api_key: None,
            kakao_local_url: "https://dapi.kakao.com".to_string(),
            kakao_navi_url: "https://apis-navi.kakaomobility.com".to_string(),
            supabase_url: None,
            supabase_key: None,
            data_path: None,
        }
    }
}
