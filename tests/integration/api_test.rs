use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use soilmatch::{api, config::MatchingConfig, service::MatchingService};

use crate::common::{supply, InMemoryRepository, StubProvider};

fn test_service(repo: InMemoryRepository) -> web::Data<Arc<MatchingService>> {
    let provider = Arc::new(StubProvider::new(1.0));
    web::Data::new(Arc::new(MatchingService::new(
        MatchingConfig::default(),
        provider,
        Arc::new(repo),
    )))
}

fn sites() -> InMemoryRepository {
    InMemoryRepository::new(vec![supply("near", 10.0, 500.0), supply("far", 90.0, 500.0)])
}

#[actix_web::test]
async fn test_match_endpoint() {
    let service = test_service(sites());
    let app =
        test::init_service(App::new().app_data(service.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "region": "경기도 수원시", "volume_m3": 100, "soil_type": "사토" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "matched");
    assert_eq!(body["table"].as_array().unwrap().len(), 2);
    assert_eq!(body["table"][0]["name"], "near");
    assert_eq!(body["table"][0]["distance_source"], "road");
    assert!(body["origin"]["detailed_address"]
        .as_str()
        .unwrap()
        .contains("representative point"));
}

#[actix_web::test]
async fn test_match_endpoint_no_match() {
    let service = test_service(sites());
    let app =
        test::init_service(App::new().app_data(service.clone()).service(api::find_match)).await;

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "region": "경기도 수원시", "volume_m3": 5000 }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "no_match");
    assert!(body["table"].as_array().unwrap().is_empty());
    assert!(!body["suggestions"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_ambiguous_region_is_unprocessable() {
    let service = test_service(sites());
    let app =
        test::init_service(App::new().app_data(service.clone()).service(api::find_match)).await;

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "region": "경기도", "volume_m3": 100 }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ambiguous_region");
    assert!(body["message"].as_str().unwrap().contains("경기도 수원시"));
}

#[actix_web::test]
async fn test_missing_region_is_unprocessable() {
    let service = test_service(sites());
    let app =
        test::init_service(App::new().app_data(service.clone()).service(api::find_match)).await;

    let req = test::TestRequest::post().uri("/match").set_json(json!({ "volume_m3": 100 }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "missing_region");
}

#[actix_web::test]
async fn test_unavailable_source_is_503() {
    let service = test_service(InMemoryRepository::failing());
    let app =
        test::init_service(App::new().app_data(service.clone()).service(api::find_match)).await;

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "region": "경기도 수원시" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_cache_endpoints() {
    let service = test_service(sites());
    let app =
        test::init_service(App::new().app_data(service.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "region": "경기도 수원시", "volume_m3": 100 }));
    test::call_service(&app, req.to_request()).await;

    let req = test::TestRequest::get().uri("/cache/stats");
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cache_enabled"], true);
    assert_eq!(body["stats"]["total"], 1);

    let req = test::TestRequest::post().uri("/cache/clear");
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/cache/stats");
    let resp = test::call_service(&app, req.to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["stats"]["total"], 0);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let service = test_service(sites());
    let app = test::init_service(App::new().app_data(service.clone()).service(api::health)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["cache"]["capacity"].is_number());
}
