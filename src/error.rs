use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// The region label cannot serve as a ranking reference point.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("No region given. Name a specific city, county or district, e.g. '경기도 수원시'")]
    Missing,

    #[error("'{label}' is too broad a region. Name a city, county or district, e.g. '{example}'")]
    Ambiguous { label: String, example: String },
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to read candidate file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed candidate data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Remote table request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Candidate source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Interpreter unavailable: {0}")]
    Unavailable(String),

    #[error("Could not interpret request: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("No candidate source reachable: {0}")]
    NoCandidateSource(String),

    #[error("Invalid request data: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for MatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchError::Region(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MatchError::NoCandidateSource(_) => StatusCode::SERVICE_UNAVAILABLE,
            MatchError::ValidationError(_) => StatusCode::BAD_REQUEST,
            MatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            MatchError::Region(region_error) => {
                let kind = match region_error {
                    RegionError::Missing => "missing_region",
                    RegionError::Ambiguous { .. } => "ambiguous_region",
                };
                HttpResponse::build(self.status_code()).json(json!({
                    "error": kind,
                    "message": region_error.to_string(),
                    "suggestions": [
                        "Include a specific city, county or district",
                        "e.g. '경기도 수원시', '서울시 강남구'"
                    ]
                }))
            }
            MatchError::NoCandidateSource(msg) => {
                log::error!("No candidate source: {}", msg);
                HttpResponse::build(self.status_code()).json(json!({
                    "error": "no_candidate_source",
                    "message": "Candidate data is currently unavailable, please try again later"
                }))
            }
            MatchError::ValidationError(msg) => {
                HttpResponse::build(self.status_code()).json(json!({
                    "error": "validation_error",
                    "message": msg
                }))
            }
            MatchError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                HttpResponse::build(self.status_code()).json(json!({
                    "error": "internal_error",
                    "message": "An internal server error occurred"
                }))
            }
        }
    }
}
