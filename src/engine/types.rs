use serde::{Deserialize, Serialize};

use crate::config::MatchingConfig;
use crate::distance::ResolvedRegion;
use crate::models::{ScoredCandidate, SoilType, Urgency, UsageCategory};

use super::{
    DEFAULT_COST_PER_TON_KM, DEFAULT_MAX_ROAD_DISTANCE_KM, DEFAULT_PREFILTER_LIMIT,
    DEFAULT_PREFILTER_RADIUS_KM, DEFAULT_SOIL_DENSITY, DEFAULT_TOP_K,
};

/// Weights of the four score terms. Each tuple sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub distance: f64,
    pub volume: f64,
    pub soil: f64,
    pub access: f64,
}

impl Weights {
    /// Weight tuple for an urgency tier.
    ///
    /// Urgent requests favour volume and soil fit over distance; relaxed
    /// requests let distance dominate.
    pub fn for_urgency(urgency: Option<Urgency>) -> Self {
        match urgency {
            Some(Urgency::Urgent) => Self {
                distance: 0.3,
                volume: 0.4,
                soil: 0.2,
                access: 0.1,
            },
            Some(Urgency::Relaxed) => Self {
                distance: 0.6,
                volume: 0.2,
                soil: 0.15,
                access: 0.05,
            },
            _ => Self {
                distance: 0.5,
                volume: 0.3,
                soil: 0.15,
                access: 0.05,
            },
        }
    }
}

/// Inputs to [`super::score_candidate`].
#[derive(Debug, Clone, Copy)]
pub struct ScoreFactors<'a> {
    pub distance_km: f64,
    pub supply_volume: f64,
    pub demand_volume: f64,
    pub supply_soil: Option<&'a SoilType>,
    pub demand_soil: Option<&'a SoilType>,
    pub urgency: Option<Urgency>,
    /// Usage whose soil preferences bias the soil term
    pub usage: Option<&'a UsageCategory>,
    /// Site access; always granted for now
    pub access_ok: bool,
    /// Set when the supplier cannot meet the requested date; never set for now
    pub deadline_missed: bool,
}

/// Tunables of one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    pub prefilter_radius_km: f64,
    pub prefilter_limit: usize,
    pub max_road_distance_km: f64,
    pub top_k: usize,
    pub cost_per_ton_km: f64,
    pub soil_density: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            prefilter_radius_km: DEFAULT_PREFILTER_RADIUS_KM,
            prefilter_limit: DEFAULT_PREFILTER_LIMIT,
            max_road_distance_km: DEFAULT_MAX_ROAD_DISTANCE_KM,
            top_k: DEFAULT_TOP_K,
            cost_per_ton_km: DEFAULT_COST_PER_TON_KM,
            soil_density: DEFAULT_SOIL_DENSITY,
        }
    }
}

impl From<&MatchingConfig> for EngineParams {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            prefilter_radius_km: config.prefilter_radius_km,
            prefilter_limit: config.prefilter_limit,
            max_road_distance_km: config.max_road_distance_km,
            top_k: config.top_k,
            cost_per_ton_km: config.cost_per_ton_km,
            soil_density: config.soil_density_t_per_m3,
        }
    }
}

/// Result of one ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOutcome {
    /// At most `top_k` rows, score descending
    pub ranked: Vec<ScoredCandidate>,
    /// Short rationale lines
    pub summary: Vec<String>,
    /// One note per substituted default
    pub applied_defaults: Vec<String>,
    /// Reference point the distances were measured from
    pub origin: ResolvedRegion,
    /// Volume the ranking was computed for, after defaults
    pub demand_volume_m3: f64,
}
