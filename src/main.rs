//! Main entry point for the soilmatch service.
//! Sets up the HTTP server, configures logging, and initializes the service with
//! environment-based configuration.

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use soilmatch::api;
use soilmatch::config::MatchingConfig;
use soilmatch::distance::{DistanceProvider, KakaoDistanceProvider, StraightLineProvider};
use soilmatch::repository;
use soilmatch::service::MatchingService;

fn build_provider(config: &MatchingConfig) -> Arc<dyn DistanceProvider> {
    match config.kakao_rest_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => match KakaoDistanceProvider::new(key, config) {
            Ok(provider) => {
                log::info!("Using Kakao distance provider");
                Arc::new(provider)
            }
            Err(e) => {
                log::warn!("Failed to build Kakao client, using straight-line distances: {}", e);
                Arc::new(StraightLineProvider::from_config(config))
            }
        },
        None => {
            log::info!("No Kakao API key configured, using straight-line distances");
            Arc::new(StraightLineProvider::from_config(config))
        }
    }
}

/// Main entry point for the soilmatch service.
///
/// # Server Configuration
/// - Binds to 0.0.0.0 on PORT (default 8080)
/// - Permissive CORS
/// - Endpoints: POST /match, GET /cache/stats, POST /cache/clear, GET /health
///
/// # Environment Variables
/// Configuration is read from SOILMATCH_-prefixed variables (see `config`).
/// Log level can be set via RUST_LOG.
#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = MatchingConfig::from_env_or_default();
    log::info!("Starting soilmatch service with configuration: {:?}", config);

    let provider = build_provider(&config);
    let repository = repository::from_config(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let service = web::Data::new(Arc::new(MatchingService::new(config, provider, repository)));

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid PORT: {}", e)))?;

    log::info!("Starting server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(service.clone())
            .configure(api::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
