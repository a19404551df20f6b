use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::Candidate;

use super::{CandidateQuery, CandidateRepository};

/// Tries `primary` first and falls back to `secondary` when it fails.
///
/// Only an error from both sources is reported; the secondary's error is
/// returned with the primary's appended.
pub struct FallbackRepository {
    primary: Arc<dyn CandidateRepository>,
    secondary: Arc<dyn CandidateRepository>,
}

impl FallbackRepository {
    pub fn new(
        primary: Arc<dyn CandidateRepository>,
        secondary: Arc<dyn CandidateRepository>,
    ) -> Self {
        Self { primary, secondary }
    }

    fn combine(primary: RepositoryError, secondary: RepositoryError) -> RepositoryError {
        RepositoryError::Unavailable(format!("{}; {}", secondary, primary))
    }
}

#[async_trait]
impl CandidateRepository for FallbackRepository {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn load(&self) -> Result<Vec<Candidate>, RepositoryError> {
        match self.primary.load().await {
            Ok(candidates) => Ok(candidates),
            Err(primary_err) => {
                log::warn!(
                    "{} source failed ({}), falling back to {}",
                    self.primary.name(),
                    primary_err,
                    self.secondary.name()
                );
                self.secondary
                    .load()
                    .await
                    .map_err(|e| Self::combine(primary_err, e))
            }
        }
    }

    async fn query(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError> {
        match self.primary.query(query).await {
            Ok(candidates) => Ok(candidates),
            Err(primary_err) => {
                log::warn!(
                    "{} query failed ({}), falling back to {}",
                    self.primary.name(),
                    primary_err,
                    self.secondary.name()
                );
                self.secondary
                    .query(query)
                    .await
                    .map_err(|e| Self::combine(primary_err, e))
            }
        }
    }
}
