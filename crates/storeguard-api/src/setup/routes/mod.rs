//! Route configuration and setup.

mod health;

use crate::api_doc::openapi_json;
use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::error::error_details_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use storeguard_core::Config;
use storeguard_infra::{request_id_middleware, security_headers_middleware, SecurityHeadersConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = usize::try_from(config.max_evidence_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    tracing::info!(body_limit_bytes = body_limit, "Request body limit configured");

    let security_headers_config = SecurityHeadersConfig {
        hsts: config.is_production(),
    };

    let api_routes = Router::new()
        .route("/csrf-token", get(handlers::csrf_token::issue_csrf_token))
        .route("/reports", post(handlers::reports::submit_report))
        .layer(DefaultBodyLimit::max(body_limit));

    let app = Router::new()
        .nest(API_PREFIX, api_routes)
        .merge(public_routes(config))
        .layer(axum::middleware::from_fn_with_state(
            !config.is_production(),
            error_details_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid origin in CORS_ORIGINS: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(config: &Config) -> Router<Arc<AppState>> {
    let service = config.service_name().to_string();
    let version = config.service_version().to_string();

    Router::new()
        .route(
            "/health",
            get(move || health::health_check(service.clone(), version.clone())),
        )
        .route("/live", get(health::liveness_check))
        .route("/api/openapi.json", get(openapi_json))
}
