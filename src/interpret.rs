//! Typed boundary to the free-text request interpreter.
//!
//! Turning a sentence into an intent and entities is left to an external
//! collaborator behind [`RequestInterpreter`]. Whatever it returns, the
//! confidence reported to callers comes from [`Interpretation::assess`],
//! a fixed policy based on which entities were found.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::{route_key, ResultCache};
use crate::error::InterpretError;
use crate::models::{DemandRequest, SoilType, Urgency, UsageCategory};

/// Confidence before any entity is found.
const BASE_CONFIDENCE: f64 = 0.6;
/// Confidence below which the intent collapses to `Unknown`.
const MIN_CONFIDENCE: f64 = 0.5;
/// Upper bound for any interpretation.
const MAX_CONFIDENCE: f64 = 0.95;

/// What the requester is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    MatchFind,
    RegisterSupply,
    RegisterDemand,
    LawQa,
    DataUploadHelp,
    Smalltalk,
    Unknown,
}

/// Entities extracted from a request. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    pub region: Option<String>,
    pub volume_m3: Option<f64>,
    pub soil_type: Option<String>,
    pub distance_km: Option<f64>,
    pub date: Option<String>,
    pub purpose: Option<String>,
    pub urgency: Option<String>,
    pub usage: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Entities {
    /// Normalises the free-text entities into a ranking request.
    ///
    /// Labels are folded onto canonical categories; unknown urgency labels
    /// and non-positive volumes are dropped so the defaults apply.
    pub fn to_demand(&self) -> DemandRequest {
        DemandRequest {
            region: non_empty(&self.region).unwrap_or_default().to_string(),
            volume_m3: self.volume_m3.filter(|v| v.is_finite() && *v > 0.0),
            soil_type: non_empty(&self.soil_type).map(SoilType::from_label),
            usage: non_empty(&self.usage).map(UsageCategory::from_label),
            purpose: non_empty(&self.purpose).map(str::to_string),
            urgency: non_empty(&self.urgency).and_then(Urgency::from_label),
        }
    }
}

/// An interpreted request with its policy confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub intent: Intent,
    pub confidence: f64,
    pub entities: Entities,
    pub reason: String,
}

impl Interpretation {
    /// Result for blank input.
    pub fn empty() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            entities: Entities::default(),
            reason: "empty".to_string(),
        }
    }

    /// Applies the confidence policy to a raw intent and its entities.
    ///
    /// Starts at 0.6 and adds 0.15 for a region, 0.15 for a volume and 0.1
    /// for a soil type. Unknown and smalltalk intents are capped at 0.5,
    /// match-find and register-demand at 0.9, everything at 0.95. A result
    /// under 0.5 reports `Intent::Unknown`.
    pub fn assess(intent: Intent, entities: Entities, reason: impl Into<String>) -> Self {
        let mut confidence = BASE_CONFIDENCE;
        if non_empty(&entities.region).is_some() {
            confidence += 0.15;
        }
        if entities.volume_m3.map_or(false, |v| v != 0.0) {
            confidence += 0.15;
        }
        if non_empty(&entities.soil_type).is_some() {
            confidence += 0.1;
        }

        confidence = match intent {
            Intent::Unknown | Intent::Smalltalk => confidence.min(0.5),
            Intent::MatchFind | Intent::RegisterDemand => confidence.min(0.9),
            _ => confidence,
        };

        Self {
            intent: if confidence >= MIN_CONFIDENCE {
                intent
            } else {
                Intent::Unknown
            },
            confidence: (confidence.min(MAX_CONFIDENCE) * 100.0).round() / 100.0,
            entities,
            reason: reason.into(),
        }
    }
}

/// External text-understanding collaborator.
#[async_trait]
pub trait RequestInterpreter: Send + Sync {
    /// Classifies the request.
    async fn classify(&self, text: &str) -> Result<Intent, InterpretError>;

    /// Extracts entities, given the classified intent.
    async fn extract(&self, text: &str, intent: Intent) -> Result<Entities, InterpretError>;
}

/// Memoises interpretations per normalised input text.
pub struct CachedInterpreter<I> {
    inner: I,
    cache: Arc<ResultCache<Interpretation>>,
}

impl<I: RequestInterpreter> CachedInterpreter<I> {
    pub fn new(inner: I, cache: Arc<ResultCache<Interpretation>>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ResultCache<Interpretation> {
        &self.cache
    }

    /// Interprets `text`, consulting the cache first.
    ///
    /// # Returns
    /// - Ok(Interpretation) with intent `Unknown` and confidence 0 for blank text
    /// - Err(InterpretError) if the interpreter fails; failures are not cached
    pub async fn interpret(&self, text: &str) -> Result<Interpretation, InterpretError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Interpretation::empty());
        }

        let key = route_key(text).map_err(|e| InterpretError::Malformed(e.to_string()))?;
        self.cache
            .get_or_compute(&key, || async {
                let intent = self.inner.classify(text).await?;
                let entities = self.inner.extract(text, intent).await?;
                let interpretation = Interpretation::assess(intent, entities, "interpreted");
                log::info!(
                    "Interpreted request as {:?} ({:.2})",
                    interpretation.intent,
                    interpretation.confidence
                );
                Ok::<_, InterpretError>(interpretation)
            })
            .await
    }
}
