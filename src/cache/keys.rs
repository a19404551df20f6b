//! Deterministic cache keys.
//!
//! Inputs are serialised to JSON, object keys are put in sorted order at
//! every depth, and the canonical text is hashed with SHA-256. Two
//! structurally equal inputs therefore always produce the same key, no
//! matter how their maps were populated.

use serde::Serialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::models::{Candidate, DemandRequest};

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Hex SHA-256 of the canonical JSON form of `value`.
pub fn digest<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = canonicalize(serde_json::to_value(value)?).to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Key for a memoised request interpretation.
pub fn route_key(text: &str) -> Result<String, serde_json::Error> {
    Ok(format!("route:{}", digest(text.trim())?))
}

/// Key for a memoised ranking.
///
/// Covers the normalised request and a digest of the candidate set, so a
/// changed candidate set never reuses a ranking computed for another one.
pub fn match_key(
    request: &DemandRequest,
    candidates: &[Candidate],
) -> Result<String, serde_json::Error> {
    let candidates_hash = digest(candidates)?;
    Ok(format!(
        "match:{}",
        digest(&json!({ "entities": request, "candidates_hash": candidates_hash }))?
    ))
}
