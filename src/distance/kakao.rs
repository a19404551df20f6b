//! Kakao local/mobility API client.
//!
//! - Address search resolves region labels to coordinates.
//! - The directions API provides road distances.
//! - coord2address describes the reference point for responses.
//!
//! Every call carries the configured short timeout; no call is retried.

use reqwest::Client;
use serde::Deserialize;

use crate::config::MatchingConfig;
use crate::error::RegionError;
use crate::models::GeoPoint;

use super::{check_specificity, DistanceEstimate, DistanceProvider, RegionSource, ResolvedRegion};

const USER_AGENT: &str = concat!("soilmatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    /// Absent when the route search failed
    summary: Option<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Metres
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct AddressSearchResponse {
    #[serde(default)]
    documents: Vec<AddressDocument>,
}

#[derive(Debug, Deserialize)]
struct AddressDocument {
    /// Longitude
    x: String,
    /// Latitude
    y: String,
}

#[derive(Debug, Deserialize)]
struct Coord2AddressResponse {
    #[serde(default)]
    documents: Vec<Coord2AddressDocument>,
}

#[derive(Debug, Deserialize)]
struct Coord2AddressDocument {
    address: Option<RegionNames>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionNames {
    #[serde(default)]
    region_1depth_name: String,
    #[serde(default)]
    region_2depth_name: String,
    #[serde(default)]
    region_3depth_name: String,
    #[serde(default)]
    region_4depth_name: String,
}

impl RegionNames {
    /// Most specific "region1 region2 region3 [region4]" label available.
    fn compose(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.region_1depth_name.as_str(),
            self.region_2depth_name.as_str(),
            self.region_3depth_name.as_str(),
            self.region_4depth_name.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Clone)]
pub struct KakaoDistanceProvider {
    http: Client,
    api_key: String,
    local_url: String,
    navi_url: String,
    road_factor: f64,
    fallback: GeoPoint,
}

impl KakaoDistanceProvider {
    pub fn new(
        api_key: impl Into<String>,
        config: &MatchingConfig,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.distance_timeout())
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            local_url: config.kakao_local_url.trim_end_matches('/').to_string(),
            navi_url: config.kakao_navi_url.trim_end_matches('/').to_string(),
            road_factor: config.road_factor,
            fallback: config.default_point(),
        })
    }

    fn authorization(&self) -> String {
        format!("KakaoAK {}", self.api_key)
    }

    async fn fetch_route_km(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Result<Option<f64>, reqwest::Error> {
        let origin = format!("{},{}", from.lon, from.lat);
        let destination = format!("{},{}", to.lon, to.lat);
        let response = self
            .http
            .get(format!("{}/v1/directions", self.navi_url))
            .header("Authorization", self.authorization())
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("priority", "RECOMMEND"),
                ("car_fuel", "GASOLINE"),
                ("car_hipass", "false"),
                ("alternatives", "false"),
                ("road_details", "false"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: DirectionsResponse = response.json().await?;
        Ok(body
            .routes
            .into_iter()
            .next()
            .and_then(|route| route.summary)
            .map(|summary| summary.distance / 1000.0))
    }

    async fn geocode(&self, label: &str) -> Result<Option<GeoPoint>, reqwest::Error> {
        let response = self
            .http
            .get(format!("{}/v2/local/search/address.json", self.local_url))
            .header("Authorization", self.authorization())
            .query(&[("query", label)])
            .send()
            .await?
            .error_for_status()?;

        let body: AddressSearchResponse = response.json().await?;
        Ok(body.documents.into_iter().next().and_then(|doc| {
            match (doc.y.parse::<f64>(), doc.x.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Some(GeoPoint::new(lat, lon)),
                _ => None,
            }
        }))
    }

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Option<String>, reqwest::Error> {
        let x = point.lon.to_string();
        let y = point.lat.to_string();
        let response = self
            .http
            .get(format!("{}/v2/local/geo/coord2address.json", self.local_url))
            .header("Authorization", self.authorization())
            .query(&[("x", x.as_str()), ("y", y.as_str()), ("input_coord", "WGS84")])
            .send()
            .await?
            .error_for_status()?;

        let body: Coord2AddressResponse = response.json().await?;
        Ok(body
            .documents
            .into_iter()
            .next()
            .and_then(|doc| doc.address)
            .and_then(|names| names.compose()))
    }
}

#[async_trait::async_trait]
impl DistanceProvider for KakaoDistanceProvider {
    async fn real_distance_km(&self, from: GeoPoint, to: GeoPoint) -> DistanceEstimate {
        match self.fetch_route_km(from, to).await {
            Ok(Some(km)) => DistanceEstimate::road(km),
            Ok(None) => {
                log::warn!("Directions API returned no route, using straight-line estimate");
                DistanceEstimate::estimated(from, to, self.road_factor)
            }
            Err(e) => {
                log::warn!("Directions API error, using straight-line estimate: {}", e);
                DistanceEstimate::estimated(from, to, self.road_factor)
            }
        }
    }

    fn geocodes(&self) -> bool {
        true
    }

    async fn resolve_region(&self, label: &str) -> Result<ResolvedRegion, RegionError> {
        let label = check_specificity(label)?;
        match self.geocode(label).await {
            Ok(Some(point)) => {
                log::debug!("Geocoded '{}' to {}, {}", label, point.lat, point.lon);
                Ok(ResolvedRegion {
                    point,
                    source: RegionSource::Geocoded,
                })
            }
            Ok(None) => {
                log::warn!("No geocoding result for '{}', using default coordinate", label);
                Ok(ResolvedRegion {
                    point: self.fallback,
                    source: RegionSource::Fallback,
                })
            }
            Err(e) => {
                log::warn!("Geocoding '{}' failed, using default coordinate: {}", label, e);
                Ok(ResolvedRegion {
                    point: self.fallback,
                    source: RegionSource::Fallback,
                })
            }
        }
    }

    async fn describe_point(&self, point: GeoPoint) -> Option<String> {
        match self.reverse_geocode(point).await {
            Ok(address) => address,
            Err(e) => {
                log::warn!("Reverse geocoding failed: {}", e);
                None
            }
        }
    }
}
