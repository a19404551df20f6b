//! Distance and geocoding collaborators.
//!
//! The ranking engine only ever talks to a [`DistanceProvider`]. Provider
//! failures never surface as errors: road distances degrade to a scaled
//! straight-line estimate and unresolvable regions degrade to the configured
//! default coordinate. The only error a provider reports is an input that is
//! too coarse to rank against ([`RegionError`]).

mod kakao;
mod offline;
mod region;

pub use kakao::KakaoDistanceProvider;
pub use offline::StraightLineProvider;
pub use region::check_specificity;

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::models::{DistanceSource, GeoPoint};

/// Multiplier turning a straight-line distance into a road-distance estimate.
pub const DEFAULT_ROAD_FACTOR: f64 = 1.4;

/// A travel distance and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate {
    pub km: f64,
    pub source: DistanceSource,
}

impl DistanceEstimate {
    pub fn road(km: f64) -> Self {
        Self {
            km,
            source: DistanceSource::Road,
        }
    }

    pub fn estimated(from: GeoPoint, to: GeoPoint, road_factor: f64) -> Self {
        Self {
            km: haversine_km(from, to) * road_factor,
            source: DistanceSource::Estimated,
        }
    }
}

/// How a region label was turned into coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionSource {
    /// Coordinates returned by the geocoder
    Geocoded,
    /// Geocoder unavailable or had no result; default coordinate used
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRegion {
    pub point: GeoPoint,
    pub source: RegionSource,
}

/// Great-circle distance in km. Pure, no I/O.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let a = Point::new(from.lon, from.lat);
    let b = Point::new(to.lon, to.lat);
    a.haversine_distance(&b) / 1000.0
}

/// Source of travel distances and region coordinates.
///
/// Implementations must be thread-safe; the engine issues road-distance
/// lookups for one ranking call concurrently.
#[async_trait::async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Straight-line distance used for prefiltering.
    fn straight_line_km(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        haversine_km(from, to)
    }

    /// Road distance between two points. Never fails: on any provider
    /// problem this returns the straight-line estimate instead.
    async fn real_distance_km(&self, from: GeoPoint, to: GeoPoint) -> DistanceEstimate;

    /// Resolves a region label to a reference point.
    ///
    /// # Returns
    /// - Err(RegionError) if the label is empty or names only a province/metro city
    /// - Ok(ResolvedRegion) otherwise, with `RegionSource::Fallback` when geocoding failed
    async fn resolve_region(&self, label: &str) -> Result<ResolvedRegion, RegionError>;

    /// Whether `resolve_region` consults a live geocoder. A `Fallback`
    /// region from such a provider may be transient.
    fn geocodes(&self) -> bool {
        false
    }

    /// Human-readable address of a point, if the provider can produce one.
    async fn describe_point(&self, _point: GeoPoint) -> Option<String> {
        None
    }
}
