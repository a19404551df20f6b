//! Candidate sources.
//!
//! A [`CandidateRepository`] yields the current snapshot of supply/demand
//! records as [`Candidate`]s. Availability is computed at load time, so
//! every load reflects today's progress through each site's schedule.

mod fallback;
mod file;
mod progress;
mod record;
mod remote;

pub use fallback::FallbackRepository;
pub use file::FileRepository;
pub use progress::{parse_date, progress_ratio, OccurrenceWindow, RateModel};
pub use record::RawRecord;
pub use remote::RemoteTableRepository;

use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use crate::config::MatchingConfig;
use crate::error::RepositoryError;
use crate::models::{Candidate, DemandRequest, SoilType, UsageCategory};

/// Default file read when no other source is configured.
pub const DEFAULT_DATA_PATH: &str = "data/soil_data.json";

/// Filters for a narrowed candidate query.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    /// Substring the record address must contain
    pub region: Option<String>,
    pub soil_type: Option<SoilType>,
    pub usage: Option<UsageCategory>,
    /// Minimum volume in m³ a record must offer
    pub volume_m3: Option<f64>,
    /// Maximum number of rows returned
    pub limit: usize,
}

impl CandidateQuery {
    pub fn from_request(request: &DemandRequest, limit: usize) -> Self {
        Self {
            region: Some(request.region.trim().to_string()).filter(|r| !r.is_empty()),
            soil_type: request.soil_type.clone(),
            usage: request.usage.clone(),
            volume_m3: request.volume_m3.filter(|v| v.is_finite() && *v > 0.0),
            limit,
        }
    }

    /// Whether a candidate satisfies every filter that is set.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(region) = &self.region {
            if !candidate.address.to_lowercase().contains(&region.to_lowercase()) {
                return false;
            }
        }
        if let Some(soil) = &self.soil_type {
            if candidate.soil_type.as_ref() != Some(soil) {
                return false;
            }
        }
        if let Some(usage) = &self.usage {
            if candidate.usage.as_ref() != Some(usage) {
                return false;
            }
        }
        if let Some(volume) = self.volume_m3 {
            if candidate.current_volume_m3 < volume {
                return false;
            }
        }
        true
    }
}

/// Source of candidate snapshots.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Loads every record.
    async fn load(&self) -> Result<Vec<Candidate>, RepositoryError>;

    /// Loads records matching `query`, at most `query.limit` of them.
    ///
    /// The default implementation filters a full load.
    async fn query(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError> {
        let all = self.load().await?;
        Ok(all.into_iter().filter(|c| query.matches(c)).take(query.limit).collect())
    }
}

pub(crate) fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Builds the repository chain described by the configuration.
///
/// With remote table credentials the remote table is primary and the data
/// file is the fallback; otherwise only the data file is read.
///
/// # Returns
/// - Ok(repository) ready for use
/// - Err(RepositoryError) if the remote client cannot be constructed
pub fn from_config(
    config: &MatchingConfig,
) -> Result<Arc<dyn CandidateRepository>, RepositoryError> {
    let data_path = config.data_path.clone().unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let file = FileRepository::new(data_path, config.default_point());

    match (&config.supabase_url, &config.supabase_key) {
        (Some(url), Some(key)) => {
            log::info!("Using remote candidate table at {} with file fallback", url);
            let remote = RemoteTableRepository::new(url, key, config)?;
            Ok(Arc::new(FallbackRepository::new(Arc::new(remote), Arc::new(file))))
        }
        _ => {
            log::info!("Using candidate file {}", file.path().display());
            Ok(Arc::new(file))
        }
    }
}
