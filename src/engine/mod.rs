// Candidate ranking engine
mod defaults;
mod rank;
mod scoring;
mod summary;
mod types;

// Public exports from the engine module
pub use defaults::{default_volume_for, resolve_volume};
pub use rank::{dedupe_by_name, select_top, MatchingEngine};
pub use scoring::{
    distance_term, score_candidate, soil_match_score, soil_similarity, transport_cost,
    usage_preference, volume_fit_score,
};
pub use summary::build_summary;
pub use types::*;

// Constants
/// Straight-line radius of the prefilter, in km
pub const DEFAULT_PREFILTER_RADIUS_KM: f64 = 200.0;

/// Maximum number of prefilter survivors that get a road-distance lookup
pub const DEFAULT_PREFILTER_LIMIT: usize = 10;

/// Road-distance cutoff, in km
pub const DEFAULT_MAX_ROAD_DISTANCE_KM: f64 = 500.0;

/// Number of ranked rows returned
pub const DEFAULT_TOP_K: usize = 3;

/// Distance at which the distance term reaches zero, in km
pub const REFERENCE_DISTANCE_KM: f64 = 200.0;

/// Points added for the most urgent tier
pub const URGENT_BONUS: f64 = 5.0;

/// Points added for the second most urgent tier
pub const SOON_BONUS: f64 = 3.0;

/// Points deducted when a deadline cannot be met
pub const DEADLINE_PENALTY: f64 = 10.0;

/// Soil term used when either side's soil is unknown
pub const NEUTRAL_SOIL_SCORE: f64 = 0.5;

/// Haulage price per ton per km
pub const DEFAULT_COST_PER_TON_KM: f64 = 123.0;

/// Soil density in tons per m³
pub const DEFAULT_SOIL_DENSITY: f64 = 1.5;
