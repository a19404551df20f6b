use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::models::{Candidate, GeoPoint, Role, SoilType, UsageCategory};

use super::progress::{progress_ratio, OccurrenceWindow, RateModel};

/// One row of the candidate table as stored at the source.
///
/// Every column is optional; sources are hand-maintained and frequently
/// leave cells empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub project_id: Option<Value>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub soil_category: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub total_volume_m3: Option<f64>,
    #[serde(default)]
    pub inout_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub occurrence_start: Option<String>,
    #[serde(default)]
    pub occurrence_end: Option<String>,
    #[serde(default)]
    pub duration_days: Option<f64>,
    #[serde(default)]
    pub rate_model_code: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl RawRecord {
    fn id(&self) -> Option<String> {
        match self.project_id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Converts the row into a ranking candidate as of `today`.
    ///
    /// Missing coordinates fall back to `fallback`, a missing total volume
    /// counts as 0 and an unusable occurrence window makes nothing available.
    pub fn into_candidate(self, today: Date, fallback: GeoPoint) -> Candidate {
        let id = self.id();
        let name = non_empty(self.project_name.as_deref())
            .map(str::to_string)
            .or_else(|| id.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let window = OccurrenceWindow::from_raw(
            self.occurrence_start.as_deref(),
            self.occurrence_end.as_deref(),
            self.duration_days,
        );
        if window.is_none() {
            log::warn!(
                "Record '{}' has no usable occurrence window, treating as unavailable",
                name
            );
        }
        let model = RateModel::from_code(self.rate_model_code);
        let ratio = progress_ratio(window.as_ref(), model, today);

        let volume = self.total_volume_m3.filter(|v| v.is_finite()).unwrap_or(0.0);
        let position = GeoPoint::new(
            self.lat.filter(|v| v.is_finite()).unwrap_or(fallback.lat),
            self.lng.filter(|v| v.is_finite()).unwrap_or(fallback.lon),
        );

        Candidate {
            id,
            role: Role::from_status(self.inout_status.as_deref()),
            kind: non_empty(self.kind.as_deref()).map(str::to_string),
            soil_type: non_empty(self.soil_category.as_deref()).map(SoilType::from_label),
            usage: non_empty(self.usage.as_deref()).map(UsageCategory::from_label),
            address: self.address.map(|a| a.trim().to_string()).unwrap_or_default(),
            position,
            volume_m3: volume,
            progress_ratio: ratio,
            current_volume_m3: ratio * volume,
            name,
        }
    }
}
