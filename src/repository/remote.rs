use std::fmt;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::MatchingConfig;
use crate::error::RepositoryError;
use crate::models::{Candidate, GeoPoint};

use super::{today, CandidateQuery, CandidateRepository, RawRecord};

/// Table holding the candidate records.
const TABLE_PATH: &str = "/rest/v1/soil_data";

/// Reads candidates from a PostgREST-style remote table.
///
/// Narrowed queries are pushed down as column filters so only matching
/// rows cross the wire.
#[derive(Clone)]
pub struct RemoteTableRepository {
    http: Client,
    base_url: String,
    api_key: String,
    fallback: GeoPoint,
}

impl RemoteTableRepository {
    pub fn new(
        base_url: &str,
        api_key: &str,
        config: &MatchingConfig,
    ) -> Result<Self, RepositoryError> {
        let http = Client::builder()
            .user_agent(concat!("soilmatch/", env!("CARGO_PKG_VERSION")))
            .timeout(config.repository_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            fallback: config.default_point(),
        })
    }

    /// PostgREST filter parameters for a narrowed query.
    pub fn filter_params(query: &CandidateQuery) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        if let Some(region) = &query.region {
            params.push(("address".to_string(), format!("ilike.*{}*", region)));
        }
        if let Some(soil) = &query.soil_type {
            params.push(("soil_category".to_string(), format!("eq.{}", soil.label())));
        }
        if let Some(usage) = &query.usage {
            params.push(("usage".to_string(), format!("eq.{}", usage.label())));
        }
        // Availability is computed locally, so only the nominal total can be pushed down
        if let Some(volume) = query.volume_m3 {
            params.push(("total_volume_m3".to_string(), format!("gte.{}", volume)));
        }
        params.push(("limit".to_string(), query.limit.to_string()));
        params
    }

    async fn fetch(&self, params: &[(String, String)]) -> Result<Vec<Candidate>, RepositoryError> {
        let records: Vec<RawRecord> = self
            .http
            .get(format!("{}{}", self.base_url, TABLE_PATH))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let today = today();
        Ok(records
            .into_iter()
            .map(|r| r.into_candidate(today, self.fallback))
            .collect())
    }
}

impl fmt::Debug for RemoteTableRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTableRepository")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CandidateRepository for RemoteTableRepository {
    fn name(&self) -> &str {
        "remote"
    }

    async fn load(&self) -> Result<Vec<Candidate>, RepositoryError> {
        let candidates = self.fetch(&[("select".to_string(), "*".to_string())]).await?;
        if candidates.is_empty() {
            return Err(RepositoryError::Unavailable("remote table returned no rows".to_string()));
        }
        log::info!("Loaded {} records from remote table", candidates.len());
        Ok(candidates)
    }

    async fn query(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError> {
        let candidates = self.fetch(&Self::filter_params(query)).await?;
        log::info!("Narrowed remote query returned {} records", candidates.len());
        Ok(candidates)
    }
}
