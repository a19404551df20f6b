use crate::config::MatchingConfig;
use crate::error::RegionError;
use crate::models::GeoPoint;

use super::{check_specificity, DistanceEstimate, DistanceProvider, RegionSource, ResolvedRegion};

/// Provider that never leaves the process.
///
/// Road distances are always the straight-line estimate and every specific
/// region resolves to the fallback coordinate. Used when no routing API key
/// is configured.
#[derive(Debug, Clone)]
pub struct StraightLineProvider {
    road_factor: f64,
    fallback: GeoPoint,
}

impl StraightLineProvider {
    pub fn new(road_factor: f64, fallback: GeoPoint) -> Self {
        Self {
            road_factor,
            fallback,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.road_factor, config.default_point())
    }
}

#[async_trait::async_trait]
impl DistanceProvider for StraightLineProvider {
    async fn real_distance_km(&self, from: GeoPoint, to: GeoPoint) -> DistanceEstimate {
        DistanceEstimate::estimated(from, to, self.road_factor)
    }

    async fn resolve_region(&self, label: &str) -> Result<ResolvedRegion, RegionError> {
        let label = check_specificity(label)?;
        log::warn!("No geocoder configured, using default coordinate for '{}'", label);
        Ok(ResolvedRegion {
            point: self.fallback,
            source: RegionSource::Fallback,
        })
    }
}
