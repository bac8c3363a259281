//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use storeguard_core::Config;

/// Validate critical configuration values.
///
/// Fails on settings that are unsafe in production or that make the report schema
/// unsatisfiable.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.csrf_token_ttl_secs() < 60 {
        tracing::warn!(
            ttl_secs = config.csrf_token_ttl_secs(),
            "CSRF_TOKEN_TTL_SECS is very short - forms may expire before users submit"
        );
    }

    Ok(())
}

/// Log warnings for development defaults that must not reach production.
pub fn warn_on_insecure_defaults(config: &Config) {
    if !config.csrf_secret_configured() {
        tracing::warn!(
            "CSRF_SECRET not configured, using insecure default. This should be set in production."
        );
    }
    if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
    }
}
