mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::json;
use soilmatch::cache::{digest, match_key, route_key, CacheConfig, ResultCache};

use common::{demand, init, supply};

fn cache(capacity: usize, ttl: Duration) -> ResultCache<String> {
    ResultCache::new(CacheConfig {
        enabled: true,
        capacity,
        ttl,
    })
}

#[tokio::test]
async fn test_entries_expire_after_ttl() {
    init();
    let cache = cache(10, Duration::from_millis(100));
    cache.set("k", "v".to_string());
    assert_eq!(cache.get("k"), Some("v".to_string()));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(cache.get("k"), None);
    assert!(cache.is_empty(), "expired entry should be dropped on lookup");
}

#[test]
fn test_capacity_sweep_evicts_oldest() {
    let cache = cache(10, Duration::from_secs(60));
    for i in 0..10 {
        cache.set(format!("k{}", i), format!("v{}", i));
    }
    assert_eq!(cache.len(), 10);

    cache.set("k10", "v10".to_string());

    assert_eq!(cache.len(), 9);
    assert_eq!(cache.get("k0"), None);
    assert_eq!(cache.get("k1"), None);
    assert_eq!(cache.get("k2"), Some("v2".to_string()));
    assert_eq!(cache.get("k10"), Some("v10".to_string()));
}

#[test]
fn test_overwrite_keeps_single_entry() {
    let cache = cache(10, Duration::from_secs(60));
    cache.set("k", "old".to_string());
    cache.set("k", "new".to_string());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("k"), Some("new".to_string()));
}

#[test]
fn test_disabled_cache_never_stores() {
    let cache: ResultCache<String> = ResultCache::new(CacheConfig {
        enabled: false,
        ..CacheConfig::default()
    });
    cache.set("k", "v".to_string());
    assert_eq!(cache.get("k"), None);
    assert!(cache.is_empty());
    assert!(!cache.is_enabled());
}

#[tokio::test]
async fn test_stats_count_expired_entries() {
    let cache = cache(10, Duration::from_millis(100));
    cache.set("old", "v".to_string());
    tokio::time::sleep(Duration::from_millis(150)).await;

    // A lookup on another key leaves the expired entry in place
    assert_eq!(cache.get("missing"), None);
    let stats = cache.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.active, 0);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.capacity, 10);

    // A store purges it
    cache.set("new", "v".to_string());
    let stats = cache.stats();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.active, 1);
}

#[test]
fn test_clear() {
    let cache = cache(10, Duration::from_secs(60));
    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
}

#[test]
fn test_digest_ignores_key_order() {
    let mut forward = HashMap::new();
    forward.insert("region", json!("예천군"));
    forward.insert("volume_m3", json!(500));
    forward.insert("nested", json!({"b": 1, "a": 2}));

    let reordered = json!({
        "volume_m3": 500,
        "nested": {"a": 2, "b": 1},
        "region": "예천군",
    });

    assert_eq!(digest(&forward).unwrap(), digest(&reordered).unwrap());
    assert_ne!(digest(&json!({"region": "예천군"})).unwrap(), digest(&reordered).unwrap());
}

#[test]
fn test_route_key_normalises_whitespace() {
    let key = route_key("  예천군 흙 500톤  ").unwrap();
    assert!(key.starts_with("route:"));
    assert_eq!(key, route_key("예천군 흙 500톤").unwrap());
}

#[test]
fn test_match_key_tracks_candidate_set() {
    let request = demand("경기도 수원시", Some(100.0));
    let one = vec![supply("a", 10.0, 500.0)];
    let two = vec![supply("a", 10.0, 500.0), supply("b", 20.0, 500.0)];

    let key = match_key(&request, &one).unwrap();
    assert!(key.starts_with("match:"));
    assert_eq!(key, match_key(&request, &one.clone()).unwrap());
    assert_ne!(key, match_key(&request, &two).unwrap());
    assert_ne!(key, match_key(&demand("경기도 수원시", Some(200.0)), &one).unwrap());
}

#[test]
fn test_concurrent_access() {
    let cache = Arc::new(cache(50, Duration::from_secs(60)));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("k{}", (t * 31 + i) % 80);
                    cache.set(key.clone(), format!("t{}", t));
                    let _ = cache.get(&key);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 50);
}

#[tokio::test]
async fn test_get_or_compute_runs_once() {
    let cache = cache(10, Duration::from_secs(60));
    let runs = AtomicUsize::new(0);

    for _ in 0..3 {
        let value: Result<String, String> = cache
            .get_or_compute("k", || async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok("computed".to_string())
            })
            .await;
        assert_eq!(value.unwrap(), "computed");
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let failed: Result<String, String> = cache
        .get_or_compute("bad", || async { Err("boom".to_string()) })
        .await;
    assert!(failed.is_err());
    assert_eq!(cache.get("bad"), None);
}
