use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cache::{match_key, CacheConfig, ResultCache};
use crate::config::MatchingConfig;
use crate::distance::{check_specificity, DistanceProvider, RegionSource};
use crate::engine::{EngineParams, MatchingEngine, RankOutcome};
use crate::error::MatchError;
use crate::interpret::Entities;
use crate::models::{
    CacheStatus, Candidate, DemandRequest, HealthStatus, MatchResponse, MatchStatus, Origin,
};
use crate::repository::{CandidateQuery, CandidateRepository};

/// Everything stored per cached ranking.
///
/// The applied defaults and the described origin are part of the entry, so
/// a cache hit answers exactly like the call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub outcome: RankOutcome,
    pub origin: Origin,
}

/// Service that answers match requests.
///
/// A request goes through: narrowed candidate query (full load when it
/// comes back short), cache lookup keyed on the request and the candidate
/// snapshot, ranking, and description of the reference point.
#[derive(Clone)]
pub struct MatchingService {
    /// Two-stage ranking engine
    engine: MatchingEngine,
    /// Distance/geocoding collaborator, shared with the engine
    provider: Arc<dyn DistanceProvider>,
    /// Candidate source
    repository: Arc<dyn CandidateRepository>,
    /// Memoised rankings
    cache: Arc<ResultCache<MatchReport>>,
    /// Configuration for ranking and service behavior
    config: MatchingConfig,
    /// Service start time for calculating uptime
    start_time: Arc<Instant>,
}

impl MatchingService {
    pub fn new(
        config: MatchingConfig,
        provider: Arc<dyn DistanceProvider>,
        repository: Arc<dyn CandidateRepository>,
    ) -> Self {
        let engine = MatchingEngine::new(provider.clone(), EngineParams::from(&config));
        let cache = Arc::new(ResultCache::new(CacheConfig::from(&config)));
        Self {
            engine,
            provider,
            repository,
            cache,
            config,
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Loads the candidate snapshot for a request.
    ///
    /// A narrowed query is tried first; fewer than `min_query_rows` rows or
    /// a failed query trigger a full load.
    ///
    /// # Returns
    /// - Ok(candidates) from the narrowed query or the full load
    /// - Err(MatchError::NoCandidateSource) if the full load fails too
    pub async fn load_candidates(
        &self,
        request: &DemandRequest,
    ) -> Result<Vec<Candidate>, MatchError> {
        let query = CandidateQuery::from_request(request, self.config.query_limit);
        match self.repository.query(&query).await {
            Ok(candidates) if candidates.len() >= self.config.min_query_rows => {
                log::info!("Narrowed query returned {} candidates", candidates.len());
                return Ok(candidates);
            }
            Ok(candidates) => {
                log::warn!(
                    "Narrowed query returned {} candidates (< {}), loading all",
                    candidates.len(),
                    self.config.min_query_rows
                );
            }
            Err(e) => {
                log::warn!("Narrowed query failed, loading all: {}", e);
            }
        }

        let candidates = self
            .repository
            .load()
            .await
            .map_err(|e| MatchError::NoCandidateSource(e.to_string()))?;
        log::info!("Full load returned {} candidates", candidates.len());
        Ok(candidates)
    }

    fn validate(&self, entities: &Entities) -> Result<(), MatchError> {
        if let Some(volume) = entities.volume_m3 {
            if !volume.is_finite() || volume < 0.0 {
                return Err(MatchError::ValidationError(
                    "volume_m3 must be a non-negative number".to_string(),
                ));
            }
        }
        if let Some(distance) = entities.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(MatchError::ValidationError(
                    "distance_km must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn compute_report(
        &self,
        request: &DemandRequest,
        candidates: &[Candidate],
    ) -> Result<MatchReport, MatchError> {
        let outcome = self.engine.rank(request, candidates).await?;
        let point = outcome.origin.point;
        let detailed_address = match self.provider.describe_point(point).await {
            Some(address) => address,
            None => {
                log::warn!("No address for reference point of '{}'", request.region);
                format!("{} (representative point)", request.region)
            }
        };

        Ok(MatchReport {
            origin: Origin {
                address: request.region.clone(),
                lat: point.lat,
                lng: point.lon,
                detailed_address,
            },
            outcome,
        })
    }

    /// Process a match request.
    ///
    /// The matching process follows these steps:
    /// 1. Validate the entities and the region label
    /// 2. Load the candidate snapshot
    /// 3. Return the cached ranking for this request and snapshot, or rank.
    ///    A ranking measured from the default coordinate after a geocoder
    ///    failure is not stored.
    ///
    /// # Returns
    /// - Ok(MatchResponse) with status `matched`, or `no_match` plus suggestions
    /// - Err(MatchError::Region) if the region is missing or too broad
    /// - Err(MatchError::ValidationError) if a numeric entity is invalid
    /// - Err(MatchError::NoCandidateSource) if no candidate source is reachable
    pub async fn process_match(&self, entities: Entities) -> Result<MatchResponse, MatchError> {
        self.validate(&entities)?;
        let request = entities.to_demand();
        check_specificity(&request.region)?;

        let request_id = uuid::Uuid::new_v4().to_string();
        log::info!("Processing match request {} for '{}'", request_id, request.region);

        let candidates = self.load_candidates(&request).await?;
        let key =
            match_key(&request, &candidates).map_err(|e| MatchError::Internal(e.to_string()))?;
        let report = match self.cache.get(&key) {
            Some(report) => report,
            None => {
                let report = self.compute_report(&request, &candidates).await?;
                let transient = self.provider.geocodes()
                    && report.outcome.origin.source == RegionSource::Fallback;
                if transient {
                    log::warn!(
                        "Not caching ranking for '{}': measured from the default coordinate",
                        request.region
                    );
                } else {
                    self.cache.set(key, report.clone());
                }
                report
            }
        };

        let MatchReport { outcome, origin } = report;
        if outcome.ranked.is_empty() {
            log::info!("No match for request {}", request_id);
            return Ok(MatchResponse {
                status: MatchStatus::NoMatch,
                request_id,
                table: Vec::new(),
                summary: outcome.summary,
                applied_defaults: outcome.applied_defaults,
                origin,
                message: Some("No supplier matches the request".to_string()),
                suggestions: vec![
                    "Try a wider region".to_string(),
                    "Relax the soil type".to_string(),
                    "Adjust the volume".to_string(),
                ],
            });
        }

        log::info!("Request {} matched {} suppliers", request_id, outcome.ranked.len());
        Ok(MatchResponse {
            status: MatchStatus::Matched,
            request_id,
            table: outcome.ranked,
            summary: outcome.summary,
            applied_defaults: outcome.applied_defaults,
            origin,
            message: None,
            suggestions: Vec::new(),
        })
    }

    pub fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            cache_enabled: self.cache.is_enabled(),
            stats: self.cache.stats(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Get health status information for the service
    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            cache_enabled: self.cache.is_enabled(),
            cache: self.cache.stats(),
        }
    }
}
