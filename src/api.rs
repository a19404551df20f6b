//! API endpoints for the soilmatch service.
//! Provides HTTP endpoints for ranking soil suppliers against a demand request
//! and for inspecting the result cache.
//! All endpoints use JSON for request/response bodies.

use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};
use serde_json::json;
use std::sync::Arc;

use crate::interpret::Entities;
use crate::service::MatchingService;

/// Match endpoint for finding soil suppliers.
///
/// This endpoint accepts the extracted request entities as JSON:
/// - region: Specific city/county/district (required)
/// - volume_m3, soil_type, usage, purpose, urgency: optional, defaulted when absent
///
/// # Returns
/// - 200 OK with ranked suppliers, or status `no_match` with suggestions
/// - 422 Unprocessable Entity if the region is missing or too broad
/// - 400 Bad Request if a numeric field is invalid
/// - 503 Service Unavailable if no candidate source is reachable
#[post("/match")]
pub async fn find_match(
    request: web::Json<Entities>,
    service: web::Data<Arc<MatchingService>>,
) -> impl Responder {
    match service.process_match(request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

/// Cache occupancy and configuration.
#[get("/cache/stats")]
pub async fn cache_stats(service: web::Data<Arc<MatchingService>>) -> impl Responder {
    HttpResponse::Ok().json(service.cache_status())
}

/// Drops every cached ranking.
#[post("/cache/clear")]
pub async fn clear_cache(service: web::Data<Arc<MatchingService>>) -> impl Responder {
    service.clear_cache();
    HttpResponse::Ok().json(json!({ "success": true, "message": "cache cleared" }))
}

/// Health check endpoint.
///
/// # Returns
/// - 200 OK with version, uptime and cache statistics
#[get("/health")]
pub async fn health(service: web::Data<Arc<MatchingService>>) -> impl Responder {
    HttpResponse::Ok().json(service.get_health_status())
}

/// Registers every endpoint on an actix-web service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(find_match)
        .service(cache_stats)
        .service(clear_cache)
        .service(health);
}
