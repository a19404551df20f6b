use time::macros::format_description;
use time::Date;

/// Shape of the excavation/fill schedule over an occurrence window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateModel {
    /// Most material becomes available early (code 1)
    FrontLoaded,
    /// Constant rate (code 2)
    Uniform,
    /// Most material becomes available late (code 3 and anything else)
    BackLoaded,
}

impl RateModel {
    pub fn from_code(code: Option<f64>) -> Self {
        match code.map(|c| c.round() as i64) {
            Some(1) => RateModel::FrontLoaded,
            Some(2) => RateModel::Uniform,
            _ => RateModel::BackLoaded,
        }
    }

    /// Maps base progress (elapsed share of the window) to availability.
    pub fn apply(self, base: f64) -> f64 {
        match self {
            RateModel::FrontLoaded => base.sqrt(),
            RateModel::Uniform => base,
            RateModel::BackLoaded => 1.0 / (1.0 + (-(base * 12.0 - 6.0)).exp()),
        }
    }
}

/// Period during which a site produces or absorbs material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccurrenceWindow {
    pub start: Date,
    pub end: Date,
    pub duration_days: f64,
}

/// Parses the date part of a timestamp such as `2024-03-01` or
/// `2024-03-01T00:00:00+09:00`.
pub fn parse_date(text: &str) -> Option<Date> {
    let date_part = text.trim().get(..10)?;
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

impl OccurrenceWindow {
    /// Builds a window from raw record fields.
    ///
    /// # Returns
    /// - None if either date is missing or unparsable, or the duration is not positive
    pub fn from_raw(
        start: Option<&str>,
        end: Option<&str>,
        duration_days: Option<f64>,
    ) -> Option<Self> {
        let start = parse_date(start?)?;
        let end = parse_date(end?)?;
        let duration_days = duration_days.filter(|d| d.is_finite() && *d > 0.0)?;
        Some(Self {
            start,
            end,
            duration_days,
        })
    }

    /// Elapsed share of the window on `today`, clamped to [0, 1].
    pub fn base_progress(&self, today: Date) -> f64 {
        if today < self.start {
            0.0
        } else if today > self.end {
            1.0
        } else {
            let elapsed = (today - self.start).whole_days() as f64;
            (elapsed / self.duration_days).clamp(0.0, 1.0)
        }
    }
}

/// Fraction of a site's total volume available on `today`.
/// A missing or malformed window means nothing is available yet.
pub fn progress_ratio(window: Option<&OccurrenceWindow>, model: RateModel, today: Date) -> f64 {
    match window {
        Some(window) => model.apply(window.base_progress(today)),
        None => 0.0,
    }
}
