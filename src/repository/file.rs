use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::{Candidate, GeoPoint};

use super::{today, CandidateRepository, RawRecord};

/// Reads candidates from a JSON array of raw records on disk.
///
/// The file is re-read on every load so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
    fallback: GeoPoint,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>, fallback: GeoPoint) -> Self {
        Self {
            path: path.into(),
            fallback,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CandidateRepository for FileRepository {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<Vec<Candidate>, RepositoryError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<RawRecord> = serde_json::from_str(&text)?;
        let today = today();

        let candidates: Vec<Candidate> = records
            .into_iter()
            .map(|r| r.into_candidate(today, self.fallback))
            .collect();
        log::debug!("Loaded {} records from {}", candidates.len(), self.path.display());
        Ok(candidates)
    }
}
