#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use async_trait::async_trait;
use soilmatch::distance::{
    check_specificity, haversine_km, DistanceEstimate, DistanceProvider, RegionSource,
    ResolvedRegion,
};
use soilmatch::error::{RegionError, RepositoryError};
use soilmatch::models::{Candidate, DemandRequest, GeoPoint, Role, SoilType};
use soilmatch::repository::{CandidateQuery, CandidateRepository};

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Kilometres per degree of latitude on the mean-radius sphere
pub const KM_PER_DEGREE: f64 = 6371.0088 * std::f64::consts::PI / 180.0;

/// Reference point used by the stub provider (Suwon)
pub fn origin() -> GeoPoint {
    GeoPoint::new(37.2636, 127.0286)
}

/// A point `km` kilometres due north of the origin
pub fn point_at_km(km: f64) -> GeoPoint {
    let o = origin();
    GeoPoint::new(o.lat + km / KM_PER_DEGREE, o.lon)
}

/// Supply site `km` north of the origin, fully available
pub fn supply(name: &str, km: f64, volume: f64) -> Candidate {
    Candidate {
        id: None,
        name: name.to_string(),
        kind: Some("토사".to_string()),
        role: Role::Supply,
        position: point_at_km(km),
        volume_m3: volume,
        progress_ratio: 1.0,
        current_volume_m3: volume,
        soil_type: Some(SoilType::SurplusSoil),
        usage: None,
        address: format!("경기도 수원시 {}", name),
    }
}

pub fn demand(region: &str, volume: Option<f64>) -> DemandRequest {
    DemandRequest {
        region: region.to_string(),
        volume_m3: volume,
        ..Default::default()
    }
}

/// Distance provider with no I/O. Road distance is the straight line times
/// `road_factor`; every specific region resolves to [`origin`].
pub struct StubProvider {
    pub road_factor: f64,
    pub address: Option<String>,
    /// Behaves like a live geocoder that is currently failing
    pub geocoder_down: bool,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(road_factor: f64) -> Self {
        Self {
            road_factor,
            address: None,
            geocoder_down: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_geocoder_down(mut self) -> Self {
        self.geocoder_down = true;
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Number of road-distance lookups so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for StubProvider {
    async fn real_distance_km(&self, from: GeoPoint, to: GeoPoint) -> DistanceEstimate {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DistanceEstimate::road(haversine_km(from, to) * self.road_factor)
    }

    async fn resolve_region(&self, label: &str) -> Result<ResolvedRegion, RegionError> {
        check_specificity(label)?;
        if self.geocoder_down {
            return Ok(ResolvedRegion {
                point: origin(),
                source: RegionSource::Fallback,
            });
        }
        Ok(ResolvedRegion {
            point: origin(),
            source: RegionSource::Geocoded,
        })
    }

    fn geocodes(&self) -> bool {
        true
    }

    async fn describe_point(&self, _point: GeoPoint) -> Option<String> {
        self.address.clone()
    }
}

/// Candidate source backed by a vector, with switchable failures.
pub struct InMemoryRepository {
    pub candidates: Vec<Candidate>,
    pub fail_query: bool,
    pub fail_load: bool,
    query_calls: AtomicUsize,
    load_calls: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            fail_query: false,
            fail_load: false,
            query_calls: AtomicUsize::new(0),
            load_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let mut repo = Self::new(Vec::new());
        repo.fail_query = true;
        repo.fail_load = true;
        repo
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateRepository for InMemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Vec<Candidate>, RepositoryError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(RepositoryError::Unavailable("memory load disabled".to_string()));
        }
        Ok(self.candidates.clone())
    }

    async fn query(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_query {
            return Err(RepositoryError::Unavailable("memory query disabled".to_string()));
        }
        Ok(self
            .candidates
            .iter()
            .filter(|c| query.matches(c))
            .take(query.limit)
            .cloned()
            .collect())
    }
}
