use crate::models::{SoilType, Urgency, UsageCategory};

use super::{
    ScoreFactors, Weights, DEADLINE_PENALTY, NEUTRAL_SOIL_SCORE, REFERENCE_DISTANCE_KM,
    SOON_BONUS, URGENT_BONUS,
};

/// Linear falloff from 1 at 0 km to 0 at `reference_km` and beyond.
pub fn distance_term(distance_km: f64, reference_km: f64) -> f64 {
    1.0 - (distance_km / reference_km).clamp(0.0, 1.0)
}

/// Volume adequacy is binary: enough supply scores 1, anything else 0.
/// Surplus earns nothing extra, and a zero demand is met by any supply.
pub fn volume_fit_score(supply: f64, demand: f64) -> f64 {
    if supply >= demand {
        1.0
    } else {
        0.0
    }
}

/// Symmetric similarity between two distinct canonical soil classes.
/// Pairs involving an unrecognised class score 0.
pub fn soil_similarity(a: &SoilType, b: &SoilType) -> f64 {
    use SoilType::*;

    if a == b {
        return 1.0;
    }
    match (a, b) {
        (SurplusSoil, SelectFill) | (SelectFill, SurplusSoil) => 0.7,
        (SurplusSoil, RippableRock) | (RippableRock, SurplusSoil) => 0.5,
        (SurplusSoil, BlastedRock) | (BlastedRock, SurplusSoil) => 0.4,
        (SurplusSoil, WeatheredRock) | (WeatheredRock, SurplusSoil) => 0.6,
        (SelectFill, RippableRock) | (RippableRock, SelectFill) => 0.3,
        (SelectFill, BlastedRock) | (BlastedRock, SelectFill) => 0.2,
        (SelectFill, WeatheredRock) | (WeatheredRock, SelectFill) => 0.8,
        (RippableRock, BlastedRock) | (BlastedRock, RippableRock) => 0.9,
        (RippableRock, WeatheredRock) | (WeatheredRock, RippableRock) => 0.6,
        (BlastedRock, WeatheredRock) | (WeatheredRock, BlastedRock) => 0.5,
        _ => 0.0,
    }
}

/// How well a supplied soil class suits a usage.
///
/// # Returns
/// - None if the usage has no preference table
/// - Some(weight) otherwise; soils outside the table weigh 0.5
pub fn usage_preference(usage: &UsageCategory, soil: &SoilType) -> Option<f64> {
    // surplus, select fill, rippable, blasted, weathered
    let table: [f64; 5] = match usage {
        UsageCategory::Landfill => [0.9, 0.95, 0.4, 0.3, 0.6],
        UsageCategory::Backfill => [0.95, 0.9, 0.7, 0.6, 0.8],
        UsageCategory::Landscaping => [0.6, 0.9, 0.5, 0.4, 0.85],
        UsageCategory::StructuralBackfill => [0.9, 0.7, 0.95, 0.9, 0.6],
        UsageCategory::RoadEmbankment => [0.95, 0.6, 0.9, 0.95, 0.7],
        UsageCategory::OtherBeneficial => [0.8, 0.8, 0.7, 0.6, 0.7],
        UsageCategory::Other(_) => return None,
    };
    let weight = match soil {
        SoilType::SurplusSoil => table[0],
        SoilType::SelectFill => table[1],
        SoilType::RippableRock => table[2],
        SoilType::BlastedRock => table[3],
        SoilType::WeatheredRock => table[4],
        SoilType::Other(_) => 0.5,
    };
    Some(weight)
}

/// Soil term of the score.
///
/// Exact classification matches score 1. Otherwise the pairwise similarity
/// is blended 60/40 with the usage preference for the supplied soil when a
/// usage with a preference table is known.
pub fn soil_match_score(
    supply: Option<&SoilType>,
    demand: Option<&SoilType>,
    usage: Option<&UsageCategory>,
) -> f64 {
    let (supply, demand) = match (supply, demand) {
        (Some(s), Some(d)) => (s, d),
        _ => return NEUTRAL_SOIL_SCORE,
    };
    if supply == demand {
        return 1.0;
    }

    let base = soil_similarity(supply, demand);
    match usage.and_then(|u| usage_preference(u, supply)) {
        Some(preference) => base * 0.6 + preference * 0.4,
        None => base,
    }
}

fn urgency_bonus(urgency: Option<Urgency>) -> f64 {
    match urgency {
        Some(Urgency::Urgent) => URGENT_BONUS,
        Some(Urgency::Soon) => SOON_BONUS,
        _ => 0.0,
    }
}

/// Composite score of one supplier for one demand request. Never negative.
///
/// Insufficient volume is a hard gate: the score is exactly 0 whatever the
/// other factors are.
pub fn score_candidate(factors: &ScoreFactors<'_>) -> f64 {
    if factors.supply_volume < factors.demand_volume {
        return 0.0;
    }

    let weights = Weights::for_urgency(factors.urgency);
    let dist_term = distance_term(factors.distance_km, REFERENCE_DISTANCE_KM);
    let vol_term = volume_fit_score(factors.supply_volume, factors.demand_volume);
    let soil_term = soil_match_score(factors.supply_soil, factors.demand_soil, factors.usage);
    let access_term = if factors.access_ok { 1.0 } else { 0.0 };

    let base = 100.0
        * (weights.distance * dist_term
            + weights.volume * vol_term
            + weights.soil * soil_term
            + weights.access * access_term);
    let penalty = if factors.deadline_missed { DEADLINE_PENALTY } else { 0.0 };

    (base + urgency_bonus(factors.urgency) - penalty).max(0.0)
}

/// Haulage cost of `volume_m3` over `distance_km`, rounded to whole units.
pub fn transport_cost(distance_km: f64, volume_m3: f64, cost_per_ton_km: f64, density: f64) -> u64 {
    let cost = distance_km * volume_m3 * density * cost_per_ton_km;
    if cost.is_finite() && cost > 0.0 {
        cost.round() as u64
    } else {
        0
    }
}
