//! Data models for the soilmatch service.
//! Defines the value types shared by the ranking engine, the result cache,
//! the candidate repositories and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cache::CacheStats;

/// Geographic location represented by latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Urgency tier of a demand request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Most urgent tier (긴급)
    Urgent,
    /// Needed soon (급함)
    Soon,
    /// No particular urgency (보통)
    Normal,
    /// Requester can wait (여유)
    Relaxed,
}

impl Urgency {
    /// Parses an urgency label in either English or Korean.
    /// Returns None for labels that name no known tier.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "urgent" | "긴급" => Some(Urgency::Urgent),
            "soon" | "급함" => Some(Urgency::Soon),
            "normal" | "보통" => Some(Urgency::Normal),
            "relaxed" | "여유" | "천천히" => Some(Urgency::Relaxed),
            _ => None,
        }
    }
}

/// Canonical soil classification.
///
/// Source records and free-text requests use a mix of current and legacy
/// labels; everything is folded onto the five current classes. Labels that
/// name none of them are kept verbatim in `Other` and only ever match
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SoilType {
    /// 사토
    SurplusSoil,
    /// 순성토
    SelectFill,
    /// 리핑암
    RippableRock,
    /// 발파암
    BlastedRock,
    /// 풍화암
    WeatheredRock,
    Other(String),
}

impl SoilType {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "사토" | "surplus soil" | "surplus" | "사질" | "sandy" | "혼합" | "mixed" | "모래"
            | "sand" => SoilType::SurplusSoil,
            "순성토" | "select fill" | "점토" | "clay" | "황토" | "loess" => SoilType::SelectFill,
            "리핑암" | "rippable rock" | "자갈" | "gravel" => SoilType::RippableRock,
            "발파암" | "blasted rock" | "암석" | "rock" => SoilType::BlastedRock,
            "풍화암" | "weathered rock" => SoilType::WeatheredRock,
            _ => SoilType::Other(trimmed.to_string()),
        }
    }

    /// Label used in source records.
    pub fn label(&self) -> &str {
        match self {
            SoilType::SurplusSoil => "사토",
            SoilType::SelectFill => "순성토",
            SoilType::RippableRock => "리핑암",
            SoilType::BlastedRock => "발파암",
            SoilType::WeatheredRock => "풍화암",
            SoilType::Other(label) => label,
        }
    }
}

impl From<String> for SoilType {
    fn from(label: String) -> Self {
        SoilType::from_label(&label)
    }
}

impl From<SoilType> for String {
    fn from(soil: SoilType) -> Self {
        soil.label().to_string()
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Intended use of the requested material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsageCategory {
    /// 매립용
    Landfill,
    /// 되메우기용
    Backfill,
    /// 조경식재용
    Landscaping,
    /// 구조물되메우기용
    StructuralBackfill,
    /// 도로성토용
    RoadEmbankment,
    /// 기타유용
    OtherBeneficial,
    Other(String),
}

impl UsageCategory {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "매립용" | "landfill" => UsageCategory::Landfill,
            "되메우기용" | "backfill" => UsageCategory::Backfill,
            "조경식재용" | "landscaping" | "planting" => UsageCategory::Landscaping,
            "구조물되메우기용" | "structural backfill" => UsageCategory::StructuralBackfill,
            "도로성토용" | "road embankment" => UsageCategory::RoadEmbankment,
            "기타유용" | "other beneficial use" | "other" => UsageCategory::OtherBeneficial,
            _ => UsageCategory::Other(trimmed.to_string()),
        }
    }

    /// Label used in source records.
    pub fn label(&self) -> &str {
        match self {
            UsageCategory::Landfill => "매립용",
            UsageCategory::Backfill => "되메우기용",
            UsageCategory::Landscaping => "조경식재용",
            UsageCategory::StructuralBackfill => "구조물되메우기용",
            UsageCategory::RoadEmbankment => "도로성토용",
            UsageCategory::OtherBeneficial => "기타유용",
            UsageCategory::Other(label) => label,
        }
    }

    /// Short human-readable name used in rationale summaries.
    pub fn display_name(&self) -> &str {
        match self {
            UsageCategory::Landfill => "landfill",
            UsageCategory::Backfill => "backfill",
            UsageCategory::Landscaping => "landscaping",
            UsageCategory::StructuralBackfill => "structural backfill",
            UsageCategory::RoadEmbankment => "road embankment",
            UsageCategory::OtherBeneficial => "other use",
            UsageCategory::Other(label) => label,
        }
    }
}

impl From<String> for UsageCategory {
    fn from(label: String) -> Self {
        UsageCategory::from_label(&label)
    }
}

impl From<UsageCategory> for String {
    fn from(usage: UsageCategory) -> Self {
        usage.label().to_string()
    }
}

/// Status marker meaning material has not been hauled out yet.
pub const SUPPLY_STATUS_MARKER: &str = "미반출";

/// Status marker meaning material has not been received yet.
pub const DEMAND_STATUS_MARKER: &str = "미반입";

/// Whether a record offers material or needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Supply,
    Demand,
    Unknown,
}

impl Role {
    /// Derives the role from a raw in/out status string.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some(s) if s.contains(SUPPLY_STATUS_MARKER) => Role::Supply,
            Some(s) if s.contains(DEMAND_STATUS_MARKER) => Role::Demand,
            _ => Role::Unknown,
        }
    }
}

/// Normalised query describing what a requester needs.
/// Immutable for the duration of one ranking call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandRequest {
    /// Free-text region label, resolved to coordinates before ranking
    pub region: String,
    /// Required volume in m³; defaulted from purpose/usage when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<SoilType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageCategory>,
    /// Free-text purpose (agriculture, construction, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

/// Snapshot of one supply/demand record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Material kind as recorded at the source (토사, 리핑암, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub role: Role,
    pub position: GeoPoint,
    /// Nominal total volume in m³
    pub volume_m3: f64,
    /// Fraction of the total volume available today
    pub progress_ratio: f64,
    /// Volume available today in m³
    pub current_volume_m3: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<SoilType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageCategory>,
    #[serde(default)]
    pub address: String,
}

/// Where a distance figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSource {
    /// Road-network distance from the routing provider
    Road,
    /// Straight-line distance scaled by the road factor
    Estimated,
}

/// A candidate annotated with distance, cost and score for one demand request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub name: String,
    pub distance_km: f64,
    pub distance_source: DistanceSource,
    pub capacity_m3: u64,
    pub current_capacity_m3: u64,
    pub soil_type: String,
    pub kind: String,
    pub usage: String,
    pub address: String,
    pub progress_ratio: f64,
    pub transport_cost: u64,
    pub score: f64,
    pub lat: f64,
    pub lng: f64,
}

/// Reference point the ranking was computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub detailed_address: String,
}

/// Outcome status of a match request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one supplier survived ranking
    Matched,
    /// Ranking succeeded but nothing qualified
    NoMatch,
}

/// Response body of the match endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub status: MatchStatus,
    pub request_id: String,
    pub table: Vec<ScoredCandidate>,
    pub summary: Vec<String>,
    pub applied_defaults: Vec<String>,
    pub origin: Origin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Health information reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub cache_enabled: bool,
    pub cache: CacheStats,
}

/// Response body of the cache stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub cache_enabled: bool,
    pub stats: CacheStats,
}
