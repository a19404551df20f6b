use std::env;

use serial_test::serial;
use soilmatch::cache::CacheConfig;
use soilmatch::config::MatchingConfig;
use soilmatch::engine::EngineParams;

const VARS: &[&str] = &[
    "SOILMATCH_TOP_K",
    "SOILMATCH_PREFILTER_LIMIT",
    "SOILMATCH_CACHE_ENABLED",
    "SOILMATCH_CACHE_SIZE",
    "SOILMATCH_KAKAO_REST_API_KEY",
    "SOILMATCH_ROAD_FACTOR",
];

fn clear_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_when_unset() {
    clear_vars();
    let config = MatchingConfig::from_env().unwrap();

    assert_eq!(config.top_k, 3);
    assert_eq!(config.prefilter_limit, 10);
    assert_eq!(config.prefilter_radius_km, 200.0);
    assert_eq!(config.max_road_distance_km, 500.0);
    assert_eq!(config.cache_size, 100);
    assert_eq!(config.cache_duration_secs, 3600);
    assert!(config.cache_enabled);
    assert_eq!(config.kakao_rest_api_key, None);
}

#[test]
#[serial]
fn test_prefixed_variables_override_defaults() {
    clear_vars();
    env::set_var("SOILMATCH_TOP_K", "5");
    env::set_var("SOILMATCH_CACHE_ENABLED", "false");
    env::set_var("SOILMATCH_KAKAO_REST_API_KEY", "abc");

    let config = MatchingConfig::from_env().unwrap();
    clear_vars();

    assert_eq!(config.top_k, 5);
    assert!(!config.cache_enabled);
    assert_eq!(config.kakao_rest_api_key.as_deref(), Some("abc"));
    assert_eq!(config.prefilter_limit, 10);
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_vars();
    env::set_var("SOILMATCH_TOP_K", "many");
    assert!(MatchingConfig::from_env().is_err());

    env::set_var("SOILMATCH_TOP_K", "0");
    assert!(MatchingConfig::from_env().is_err());

    // Falls back to defaults instead of failing
    assert_eq!(MatchingConfig::from_env_or_default().top_k, 3);

    clear_vars();
    env::set_var("SOILMATCH_ROAD_FACTOR", "0.5");
    assert!(MatchingConfig::from_env().is_err());
    clear_vars();
}

#[test]
fn test_derived_settings() {
    let mut config = MatchingConfig::default();
    config.top_k = 7;
    config.cache_size = 42;

    let params = EngineParams::from(&config);
    assert_eq!(params.top_k, 7);
    assert_eq!(params.prefilter_limit, 10);

    let cache = CacheConfig::from(&config);
    assert_eq!(cache.capacity, 42);
    assert_eq!(cache.ttl.as_secs(), 3600);
    assert!(config.validate().is_ok());
    assert_eq!(config.repository_timeout().as_millis(), 10_000);

    config.repository_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_debug_output_hides_credentials() {
    let config = MatchingConfig {
        kakao_rest_api_key: Some("kakao-secret-key".to_string()),
        supabase_url: Some("https://table.example".to_string()),
        supabase_key: Some("table-secret-key".to_string()),
        ..MatchingConfig::default()
    };

    let logged = format!("{:?}", config);
    assert!(!logged.contains("kakao-secret-key"));
    assert!(!logged.contains("table-secret-key"));
    assert!(logged.contains("<redacted>"));
    assert!(logged.contains("https://table.example"));

    // Unset keys stay visibly unset
    assert!(format!("{:?}", MatchingConfig::default()).contains("supabase_key: None"));
}
