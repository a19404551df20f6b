use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::distance::{DistanceEstimate, DistanceProvider};
use crate::error::RegionError;
use crate::models::{Candidate, DemandRequest, GeoPoint, Role, ScoredCandidate};

use super::{
    build_summary, resolve_volume, score_candidate, transport_cost, EngineParams, RankOutcome,
    ScoreFactors,
};

/// Placeholder for text fields a record leaves empty.
const UNKNOWN_FIELD: &str = "unknown";

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Ranks supply candidates against a demand request.
///
/// Ranking runs in two stages. A cheap straight-line prefilter keeps at most
/// `prefilter_limit` supply sites inside `prefilter_radius_km` that hold
/// enough volume; only those get a road-distance lookup, so the number of
/// provider calls per ranking is bounded whatever the candidate set size.
/// The survivors are scored on road distance, deduplicated by name and cut
/// to the best `top_k`.
///
/// The engine holds no mutable state and may be shared between handlers.
#[derive(Clone)]
pub struct MatchingEngine {
    provider: Arc<dyn DistanceProvider>,
    params: EngineParams,
}

impl MatchingEngine {
    pub fn new(provider: Arc<dyn DistanceProvider>, params: EngineParams) -> Self {
        Self { provider, params }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Ranks `candidates` for `request`.
    ///
    /// # Returns
    /// - Ok(RankOutcome) with at most `top_k` rows, score descending; an
    ///   empty candidate set or no qualifying supplier gives an empty list
    /// - Err(RegionError) if the request region is missing or too broad
    pub async fn rank(
        &self,
        request: &DemandRequest,
        candidates: &[Candidate],
    ) -> Result<RankOutcome, RegionError> {
        let origin = self.provider.resolve_region(&request.region).await?;
        log::info!(
            "Ranking {} candidates for '{}' from ({}, {}) [{:?}]",
            candidates.len(),
            request.region,
            origin.point.lat,
            origin.point.lon,
            origin.source
        );

        let (demand_volume, default_note) = resolve_volume(request);
        let applied_defaults: Vec<String> = default_note.into_iter().collect();
        if !applied_defaults.is_empty() {
            log::info!("Defaults applied: {}", applied_defaults.join(", "));
        }

        let shortlist = self.prefilter(origin.point, demand_volume, candidates);
        log::info!(
            "Prefilter kept {} of {} candidates for road-distance lookup",
            shortlist.len(),
            candidates.len()
        );

        let scored = self
            .score_shortlist(origin.point, request, demand_volume, &shortlist)
            .await;
        let ranked = select_top(dedupe_by_name(scored), self.params.top_k);
        log::info!("Ranking produced {} rows", ranked.len());

        let summary = build_summary(
            request,
            demand_volume,
            self.params.prefilter_limit,
            self.params.top_k,
            &applied_defaults,
        );

        Ok(RankOutcome {
            ranked,
            summary,
            applied_defaults,
            origin,
            demand_volume_m3: demand_volume,
        })
    }

    /// Stage A: supply sites within the straight-line radius holding at least
    /// `demand_volume`, nearest first, at most `prefilter_limit` of them.
    pub fn prefilter<'a>(
        &self,
        origin: GeoPoint,
        demand_volume: f64,
        candidates: &'a [Candidate],
    ) -> Vec<(&'a Candidate, f64)> {
        let mut survivors: Vec<(&Candidate, f64)> = candidates
            .iter()
            .filter(|c| c.role == Role::Supply)
            .map(|c| (c, self.provider.straight_line_km(origin, c.position)))
            .filter(|(_, km)| *km <= self.params.prefilter_radius_km)
            .filter(|(c, _)| c.current_volume_m3 >= demand_volume)
            .collect();

        survivors.sort_by(|a, b| a.1.total_cmp(&b.1));
        survivors.truncate(self.params.prefilter_limit);
        survivors
    }

    /// Stage B: road distance, cutoff and scoring for the shortlist.
    /// Lookups for the shortlist run concurrently.
    async fn score_shortlist(
        &self,
        origin: GeoPoint,
        request: &DemandRequest,
        demand_volume: f64,
        shortlist: &[(&Candidate, f64)],
    ) -> Vec<ScoredCandidate> {
        let lookups = shortlist
            .iter()
            .map(|(candidate, _)| self.provider.real_distance_km(origin, candidate.position));
        let distances = join_all(lookups).await;

        shortlist
            .iter()
            .zip(distances)
            .filter_map(|((candidate, straight_km), estimate)| {
                if estimate.km > self.params.max_road_distance_km {
                    log::debug!(
                        "Dropping '{}': road distance {:.1}km (straight {:.1}km) beyond cutoff",
                        candidate.name,
                        estimate.km,
                        straight_km
                    );
                    return None;
                }
                Some(self.score_row(candidate, request, demand_volume, estimate))
            })
            .collect()
    }

    fn score_row(
        &self,
        candidate: &Candidate,
        request: &DemandRequest,
        demand_volume: f64,
        estimate: DistanceEstimate,
    ) -> ScoredCandidate {
        let usage = request.usage.as_ref().or(candidate.usage.as_ref());
        let score = score_candidate(&ScoreFactors {
            distance_km: estimate.km,
            supply_volume: candidate.current_volume_m3,
            demand_volume,
            supply_soil: candidate.soil_type.as_ref(),
            demand_soil: request.soil_type.as_ref(),
            urgency: request.urgency,
            usage,
            access_ok: true,
            deadline_missed: false,
        });
        let cost = transport_cost(
            estimate.km,
            demand_volume,
            self.params.cost_per_ton_km,
            self.params.soil_density,
        );
        log::debug!(
            "Scored '{}': {:.1} at {:.1}km ({:?})",
            candidate.name,
            score,
            estimate.km,
            estimate.source
        );

        ScoredCandidate {
            name: candidate.name.clone(),
            distance_km: round_to(estimate.km, 1),
            distance_source: estimate.source,
            capacity_m3: candidate.volume_m3.max(0.0) as u64,
            current_capacity_m3: candidate.current_volume_m3.max(0.0) as u64,
            soil_type: candidate
                .soil_type
                .as_ref()
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            kind: candidate.kind.clone().unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            usage: candidate
                .usage
                .as_ref()
                .map(|u| u.label().to_string())
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            address: candidate.address.clone(),
            progress_ratio: round_to(candidate.progress_ratio, 3),
            transport_cost: cost,
            score: round_to(score, 1),
            lat: candidate.position.lat,
            lng: candidate.position.lon,
        }
    }
}

/// Keeps one row per candidate name: the first-seen row unless a later one
/// scores strictly higher. Row order follows first appearance.
pub fn dedupe_by_name(rows: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<ScoredCandidate> = Vec::with_capacity(rows.len());

    for row in rows {
        match index_by_name.get(&row.name) {
            Some(&i) => {
                if row.score > kept[i].score {
                    kept[i] = row;
                }
            }
            None => {
                index_by_name.insert(row.name.clone(), kept.len());
                kept.push(row);
            }
        }
    }
    kept
}

/// Best `k` rows by score, descending. Equal scores keep their input order.
pub fn select_top(mut rows: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    rows.truncate(k);
    rows
}
