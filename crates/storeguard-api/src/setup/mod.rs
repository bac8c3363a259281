//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use storeguard_core::Config;
use storeguard_infra::telemetry::LogFormat;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    let log_format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    storeguard_infra::init_telemetry(
        config.service_name(),
        config.service_version(),
        config.environment(),
        log_format,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::warn_on_insecure_defaults(&config);
    tracing::info!("Configuration loaded and validated successfully");

    let state = services::initialize_state(&config);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
