use crate::models::DemandRequest;

/// Volume assumed when neither a volume nor a mapped purpose is given.
pub const FALLBACK_VOLUME_M3: f64 = 200.0;

/// Default volume for a purpose label, in m³.
///
/// Four base purposes carry defaults (agriculture 30, landscaping 20,
/// restoration 100, construction 200); related labels map onto them.
/// Korean labels may carry the "-용" ("for ...") suffix.
pub fn default_volume_for(purpose: &str) -> Option<f64> {
    let lowered = purpose.trim().to_lowercase();
    let key = lowered.strip_suffix('용').unwrap_or(&lowered);
    let volume = match key {
        "농업" | "agriculture" | "farming" => 30.0,
        "조경" | "조경식재" | "landscaping" | "planting" => 20.0,
        "복구" | "restoration" | "recovery" => 100.0,
        "건설" | "construction" => 200.0,
        "매립" | "landfill" => 200.0,
        "되메우기" | "backfill" => 100.0,
        "기초공사" | "foundation" | "foundation work" => 200.0,
        "도로공사" | "도로성토" | "road works" | "road construction" => 200.0,
        "하천정비" | "river maintenance" => 100.0,
        "산사태복구" | "landslide recovery" => 100.0,
        _ => return None,
    };
    Some(volume)
}

/// Requested volume after defaults, plus a note when a default was used.
///
/// The lookup key is the purpose, else the usage label. Unmapped or absent
/// keys fall back to [`FALLBACK_VOLUME_M3`].
pub fn resolve_volume(request: &DemandRequest) -> (f64, Option<String>) {
    if let Some(volume) = request.volume_m3 {
        return (volume, None);
    }

    let key = request
        .purpose
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or_else(|| request.usage.as_ref().map(|u| u.label()));

    match key {
        Some(key) => {
            let volume = default_volume_for(key).unwrap_or(FALLBACK_VOLUME_M3);
            (volume, Some(format!("volume: {}m³ (default for {})", volume, key)))
        }
        None => (
            FALLBACK_VOLUME_M3,
            Some(format!("volume: {}m³ (default)", FALLBACK_VOLUME_M3)),
        ),
    }
}
