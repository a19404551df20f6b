use std::sync::Arc;

use soilmatch::config::MatchingConfig;
use soilmatch::error::{MatchError, RegionError};
use soilmatch::interpret::Entities;
use soilmatch::models::MatchStatus;
use soilmatch::service::MatchingService;

use crate::common::{init, origin, supply, InMemoryRepository, StubProvider};

fn entities(region: &str, volume: Option<f64>) -> Entities {
    Entities {
        region: Some(region.to_string()),
        volume_m3: volume,
        ..Default::default()
    }
}

fn service_with(repo: Arc<InMemoryRepository>, config: MatchingConfig) -> MatchingService {
    let provider = Arc::new(StubProvider::new(1.0).with_address("경기 수원시 팔달구 인계동"));
    MatchingService::new(config, provider, repo)
}

fn sites() -> Vec<soilmatch::models::Candidate> {
    vec![
        supply("near", 10.0, 500.0),
        supply("mid", 60.0, 500.0),
        supply("far", 120.0, 500.0),
        supply("farther", 150.0, 500.0),
    ]
}

#[tokio::test]
async fn test_match_returns_ranked_table() {
    init();
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo, MatchingConfig::default());

    let response = service
        .process_match(entities("경기도 수원시", Some(100.0)))
        .await
        .unwrap();

    assert_eq!(response.status, MatchStatus::Matched);
    assert_eq!(response.table.len(), 3);
    assert_eq!(response.table[0].name, "near");
    assert!(!response.request_id.is_empty());
    assert!(response.message.is_none());
    assert_eq!(response.origin.address, "경기도 수원시");
    assert_eq!(response.origin.lat, origin().lat);
    assert_eq!(response.origin.detailed_address, "경기 수원시 팔달구 인계동");
}

#[tokio::test]
async fn test_cache_hit_keeps_applied_defaults() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo, MatchingConfig::default());

    let first = service.process_match(entities("경기도 수원시", None)).await.unwrap();
    let second = service.process_match(entities("경기도 수원시", None)).await.unwrap();

    assert_eq!(first.applied_defaults.len(), 1);
    assert_eq!(second.applied_defaults, first.applied_defaults);
    assert_eq!(second.table, first.table);
    assert_ne!(second.request_id, first.request_id);
    assert_eq!(service.cache_status().stats.total, 1);
}

#[tokio::test]
async fn test_short_narrowed_query_falls_back_to_full_load() {
    // No address contains the requested region, so the narrowed query is empty
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo.clone(), MatchingConfig::default());

    let response = service
        .process_match(entities("경상북도 예천군", Some(100.0)))
        .await
        .unwrap();

    assert_eq!(repo.query_calls(), 1);
    assert_eq!(repo.load_calls(), 1);
    assert_eq!(response.status, MatchStatus::Matched);
}

#[tokio::test]
async fn test_narrowed_query_used_when_enough_rows() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo.clone(), MatchingConfig::default());

    service.process_match(entities("수원시", Some(100.0))).await.unwrap();

    assert_eq!(repo.query_calls(), 1);
    assert_eq!(repo.load_calls(), 0);
}

#[tokio::test]
async fn test_no_match_has_suggestions() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo, MatchingConfig::default());

    let response = service
        .process_match(entities("경기도 수원시", Some(10_000.0)))
        .await
        .unwrap();

    assert_eq!(response.status, MatchStatus::NoMatch);
    assert!(response.table.is_empty());
    assert!(response.message.is_some());
    assert!(!response.suggestions.is_empty());
}

#[tokio::test]
async fn test_region_errors() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo.clone(), MatchingConfig::default());

    let broad = service.process_match(entities("경기도", Some(100.0))).await;
    assert!(matches!(broad, Err(MatchError::Region(RegionError::Ambiguous { .. }))));

    let missing = service.process_match(Entities::default()).await;
    assert!(matches!(missing, Err(MatchError::Region(RegionError::Missing))));

    // Rejected before any candidate is loaded
    assert_eq!(repo.query_calls(), 0);
}

#[tokio::test]
async fn test_negative_volume_is_invalid() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo, MatchingConfig::default());
    let result = service.process_match(entities("경기도 수원시", Some(-5.0))).await;
    assert!(matches!(result, Err(MatchError::ValidationError(_))));
}

#[tokio::test]
async fn test_unreachable_sources() {
    let service = service_with(Arc::new(InMemoryRepository::failing()), MatchingConfig::default());
    let result = service.process_match(entities("경기도 수원시", Some(100.0))).await;
    assert!(matches!(result, Err(MatchError::NoCandidateSource(_))));
}

#[tokio::test]
async fn test_disabled_cache_recomputes() {
    let config = MatchingConfig {
        cache_enabled: false,
        ..MatchingConfig::default()
    };
    let service = service_with(Arc::new(InMemoryRepository::new(sites())), config);

    service.process_match(entities("경기도 수원시", Some(100.0))).await.unwrap();
    service.process_match(entities("경기도 수원시", Some(100.0))).await.unwrap();

    let status = service.cache_status();
    assert!(!status.cache_enabled);
    assert_eq!(status.stats.total, 0);
}

#[tokio::test]
async fn test_default_coordinate_ranking_is_not_cached() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let provider = Arc::new(StubProvider::new(1.0).with_geocoder_down());
    let service = MatchingService::new(MatchingConfig::default(), provider, repo);

    let first = service.process_match(entities("경기도 수원시", Some(100.0))).await.unwrap();
    assert_eq!(first.status, MatchStatus::Matched);
    assert_eq!(service.cache_status().stats.total, 0);

    // Recomputed, so a recovered geocoder is picked up on the next call
    let second = service.process_match(entities("경기도 수원시", Some(100.0))).await.unwrap();
    assert_eq!(second.table, first.table);
    assert_eq!(service.cache_status().stats.total, 0);
}

#[tokio::test]
async fn test_health_and_clear() {
    let repo = Arc::new(InMemoryRepository::new(sites()));
    let service = service_with(repo, MatchingConfig::default());
    service.process_match(entities("경기도 수원시", Some(100.0))).await.unwrap();

    let health = service.get_health_status();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.cache.total, 1);

    service.clear_cache();
    assert_eq!(service.cache_status().stats.total, 0);
}
