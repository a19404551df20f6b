use crate::models::{DemandRequest, Urgency};

/// Maximum number of summary lines.
const SUMMARY_LINES: usize = 3;

/// Human-readable rationale for a ranking.
///
/// Lines are, in order: the volume threshold, the two-stage distance policy,
/// the urgency policy, and the usage/soil preference; the list is cut to
/// three lines. When defaults were applied, a note listing them takes the
/// first line.
pub fn build_summary(
    request: &DemandRequest,
    demand_volume: f64,
    prefilter_limit: usize,
    top_k: usize,
    applied_defaults: &[String],
) -> Vec<String> {
    let mut lines = Vec::with_capacity(SUMMARY_LINES + 1);

    if !applied_defaults.is_empty() {
        lines.push(format!("[defaults applied] {}", applied_defaults.join(", ")));
    }

    lines.push(format!("suppliers with at least {}m³ available first", demand_volume));
    lines.push(format!(
        "nearest {} by straight line, top {} by road distance",
        prefilter_limit, top_k
    ));
    lines.push(
        match request.urgency {
            Some(Urgency::Urgent) => "urgent request: volume and soil fit weighted highest",
            Some(Urgency::Soon) => "soon: volume and soil fit emphasised",
            Some(Urgency::Relaxed) => "relaxed request: distance weighted highest",
            _ => "combined road distance, volume and soil score",
        }
        .to_string(),
    );

    if let Some(usage) = &request.usage {
        lines.push(format!("{} soil preference applied", usage.display_name()));
    } else if let Some(purpose) = request.purpose.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.push(format!("{} soil preference applied", purpose.trim()));
    } else if let Some(soil) = &request.soil_type {
        lines.push(format!("soil '{}' preferred", soil));
    }

    lines.truncate(SUMMARY_LINES);
    lines
}
