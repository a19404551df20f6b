use crate::error::RegionError;

/// Top-level administrative names that are too coarse to rank against,
/// with a more specific example to suggest back to the requester.
struct BroadRegion {
    names: &'static [&'static str],
    example: &'static str,
}

const BROAD_REGIONS: &[BroadRegion] = &[
    BroadRegion {
        names: &["서울시", "서울", "서울특별시", "seoul", "seoul city"],
        example: "서울시 강남구",
    },
    BroadRegion {
        names: &["부산시", "부산", "부산광역시", "busan"],
        example: "부산시 해운대구",
    },
    BroadRegion {
        names: &["대구시", "대구", "대구광역시", "daegu"],
        example: "대구시 수성구",
    },
    BroadRegion {
        names: &["인천시", "인천", "인천광역시", "incheon"],
        example: "인천시 연수구",
    },
    BroadRegion {
        names: &["광주시", "광주", "광주광역시", "gwangju"],
        example: "광주시 서구",
    },
    BroadRegion {
        names: &["대전시", "대전", "대전광역시", "daejeon"],
        example: "대전시 유성구",
    },
    BroadRegion {
        names: &["울산시", "울산", "울산광역시", "ulsan"],
        example: "울산시 남구",
    },
    BroadRegion {
        names: &["세종시", "세종", "세종특별자치시", "sejong"],
        example: "세종시 조치원읍",
    },
    BroadRegion {
        names: &["경기도", "경기", "gyeonggi", "gyeonggi-do"],
        example: "경기도 수원시",
    },
    BroadRegion {
        names: &["강원도", "강원", "강원특별자치도", "gangwon", "gangwon-do"],
        example: "강원도 춘천시",
    },
    BroadRegion {
        names: &["충청북도", "충북", "chungbuk", "chungcheongbuk-do"],
        example: "충청북도 청주시",
    },
    BroadRegion {
        names: &["충청남도", "충남", "chungnam", "chungcheongnam-do"],
        example: "충청남도 천안시",
    },
    BroadRegion {
        names: &["전라북도", "전북", "전북특별자치도", "jeonbuk", "jeollabuk-do"],
        example: "전라북도 전주시",
    },
    BroadRegion {
        names: &["전라남도", "전남", "jeonnam", "jeollanam-do"],
        example: "전라남도 목포시",
    },
    BroadRegion {
        names: &["경상북도", "경북", "gyeongbuk", "gyeongsangbuk-do"],
        example: "경상북도 포항시",
    },
    BroadRegion {
        names: &["경상남도", "경남", "gyeongnam", "gyeongsangnam-do"],
        example: "경상남도 창원시",
    },
    BroadRegion {
        names: &["제주도", "제주", "제주특별자치도", "jeju", "jeju-do"],
        example: "제주도 제주시",
    },
];

/// Strips "near" qualifiers ("서울 근처", "near Seoul") so that they are
/// judged on the place they qualify.
fn strip_qualifiers(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    let without_suffix = lowered.strip_suffix("근처").unwrap_or(&lowered).trim();
    without_suffix
        .strip_prefix("near ")
        .unwrap_or(without_suffix)
        .trim()
        .to_string()
}

/// Rejects region labels that cannot serve as a ranking reference point.
///
/// # Returns
/// - Ok(trimmed label) if the label is specific enough to geocode
/// - Err(RegionError::Missing) for an empty label
/// - Err(RegionError::Ambiguous) for a bare province/metro-city name or alias
pub fn check_specificity(label: &str) -> Result<&str, RegionError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(RegionError::Missing);
    }

    let key = strip_qualifiers(trimmed);
    if key.is_empty() {
        return Err(RegionError::Missing);
    }
    if let Some(region) = BROAD_REGIONS
        .iter()
        .find(|region| region.names.iter().any(|name| *name == key))
    {
        log::info!("Rejecting region '{}': too broad", trimmed);
        return Err(RegionError::Ambiguous {
            label: trimmed.to_string(),
            example: region.example.to_string(),
        });
    }

    Ok(trimmed)
}
