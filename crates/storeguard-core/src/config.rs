//! Configuration module
//!
//! This module provides configuration structures for the API server: network settings,
//! CSRF token signing, report validation limits, and localization.

use std::env;
use std::str::FromStr;

use crate::validation::{
    Locale, ReportSchema, DEFAULT_EVIDENCE_CONTENT_TYPES, MAX_REASON_CHARS, MIN_REASON_CHARS,
};

// Common constants
const SERVER_PORT: u16 = 4000;
const CSRF_TOKEN_TTL_SECS: u64 = 3600;
const MAX_EVIDENCE_SIZE_MB: u64 = 10;
const MIN_CSRF_SECRET_LENGTH: usize = 32;

/// Secret used when neither CSRF_SECRET nor JWT_SECRET is set outside production.
pub const INSECURE_DEV_CSRF_SECRET: &str = "default-csrf-secret-change-in-production";

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub service_name: String,
    pub service_version: String,
}

/// API server configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    // CSRF configuration
    pub csrf_secret: String,
    /// false when the insecure development default is in use
    pub csrf_secret_configured: bool,
    pub csrf_token_ttl_secs: u64,
    // Report validation configuration
    pub reason_min_chars: usize,
    pub reason_max_chars: usize,
    pub max_evidence_size_bytes: u64,
    pub evidence_allowed_content_types: Vec<String>,
    pub default_locale: Locale,
    // Seed for the in-memory store directory
    pub known_store_ids: Vec<i64>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn inner(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Report schema built from the configured limits.
    pub fn report_schema(&self) -> ReportSchema {
        let c = self.inner();
        ReportSchema::new(
            c.reason_min_chars,
            c.reason_max_chars,
            c.max_evidence_size_bytes,
            c.evidence_allowed_content_types.clone(),
        )
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn service_name(&self) -> &str {
        &self.inner().base.service_name
    }

    pub fn service_version(&self) -> &str {
        &self.inner().base.service_version
    }

    pub fn csrf_secret(&self) -> &str {
        &self.inner().csrf_secret
    }

    pub fn csrf_secret_configured(&self) -> bool {
        self.inner().csrf_secret_configured
    }

    pub fn csrf_token_ttl_secs(&self) -> u64 {
        self.inner().csrf_token_ttl_secs
    }

    pub fn max_evidence_size_bytes(&self) -> u64 {
        self.inner().max_evidence_size_bytes
    }

    pub fn evidence_allowed_content_types(&self) -> &[String] {
        &self.inner().evidence_allowed_content_types
    }

    pub fn default_locale(&self) -> Locale {
        self.inner().default_locale
    }

    pub fn known_store_ids(&self) -> &[i64] {
        &self.inner().known_store_ids
    }
}

/// Read `name`, falling back to `default` when unset. A set but malformed value is an error.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    parse_value(name, env::var(name).ok(), default)
}

fn parse_value<T: FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, anyhow::Error> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, raw)),
        None => Ok(default),
    }
}

fn mib_to_bytes(mib: u64) -> Result<u64, anyhow::Error> {
    mib.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_EVIDENCE_SIZE_MB is too large: {}", mib))
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let is_production = is_production_env(&environment);

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: parse_var("PORT", SERVER_PORT)?,
            cors_origins,
            environment: environment.clone(),
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "storeguard-api".to_string()),
            service_version: env::var("OTEL_SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
        };

        let configured_secret = env::var("CSRF_SECRET")
            .or_else(|_| env::var("JWT_SECRET"))
            .ok()
            .filter(|s| !s.is_empty());
        let csrf_secret_configured = configured_secret.is_some();
        let csrf_secret =
            configured_secret.unwrap_or_else(|| INSECURE_DEV_CSRF_SECRET.to_string());

        let default_locale = match env::var("DEFAULT_LOCALE") {
            Ok(tag) => tag
                .parse::<Locale>()
                .map_err(|e| anyhow::anyhow!("DEFAULT_LOCALE: {}", e))?,
            Err(_) => Locale::default(),
        };

        let known_store_ids = env::var("KNOWN_STORE_IDS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|_| anyhow::anyhow!("KNOWN_STORE_IDS contains non-numeric id '{}'", s))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = AppConfig {
            base,
            csrf_secret,
            csrf_secret_configured,
            csrf_token_ttl_secs: parse_var("CSRF_TOKEN_TTL_SECS", CSRF_TOKEN_TTL_SECS)?,
            reason_min_chars: parse_var("REPORT_REASON_MIN_CHARS", MIN_REASON_CHARS)?,
            reason_max_chars: parse_var("REPORT_REASON_MAX_CHARS", MAX_REASON_CHARS)?,
            max_evidence_size_bytes: mib_to_bytes(parse_var(
                "MAX_EVIDENCE_SIZE_MB",
                MAX_EVIDENCE_SIZE_MB,
            )?)?,
            evidence_allowed_content_types: env::var("EVIDENCE_ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|_| DEFAULT_EVIDENCE_CONTENT_TYPES.join(","))
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            default_locale,
            known_store_ids,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if is_production_env(&self.base.environment) {
            if !self.csrf_secret_configured {
                return Err(anyhow::anyhow!(
                    "CSRF_SECRET (or JWT_SECRET) must be set in production"
                ));
            }
            if self.csrf_secret.len() < MIN_CSRF_SECRET_LENGTH {
                return Err(anyhow::anyhow!(
                    "CSRF_SECRET must be at least {} characters long",
                    MIN_CSRF_SECRET_LENGTH
                ));
            }
        }

        if self.csrf_token_ttl_secs == 0 {
            return Err(anyhow::anyhow!("CSRF_TOKEN_TTL_SECS must be greater than 0"));
        }

        if self.reason_min_chars > self.reason_max_chars {
            return Err(anyhow::anyhow!(
                "REPORT_REASON_MIN_CHARS ({}) exceeds REPORT_REASON_MAX_CHARS ({})",
                self.reason_min_chars,
                self.reason_max_chars
            ));
        }

        if self.max_evidence_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_EVIDENCE_SIZE_MB must be greater than 0"));
        }

        if self.evidence_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "EVIDENCE_ALLOWED_CONTENT_TYPES must list at least one media type"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(environment: &str) -> AppConfig {
        AppConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["https://example.test".to_string()],
                environment: environment.to_string(),
                service_name: "storeguard-api".to_string(),
                service_version: "0.1.0".to_string(),
            },
            csrf_secret: INSECURE_DEV_CSRF_SECRET.to_string(),
            csrf_secret_configured: false,
            csrf_token_ttl_secs: 3600,
            reason_min_chars: 10,
            reason_max_chars: 500,
            max_evidence_size_bytes: 10 * 1024 * 1024,
            evidence_allowed_content_types: vec!["image/png".to_string()],
            default_locale: Locale::Th,
            known_store_ids: vec![1, 2],
        }
    }

    #[test]
    fn test_dev_default_secret_allowed_outside_production() {
        assert!(test_config("development").validate().is_ok());
    }

    #[test]
    fn test_production_requires_configured_secret() {
        let config = test_config("production");
        assert!(config.validate().is_err());

        let mut config = test_config("prod");
        config.csrf_secret_configured = true;
        config.csrf_secret = "too-short".to_string();
        assert!(config.validate().is_err());

        config.csrf_secret = "x".repeat(32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_reason_bounds_rejected() {
        let mut config = test_config("development");
        config.reason_min_chars = 20;
        config.reason_max_chars = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_numeric_values_are_errors() {
        assert_eq!(parse_value("CSRF_TOKEN_TTL_SECS", None, 3600u64).unwrap(), 3600);
        assert_eq!(
            parse_value("CSRF_TOKEN_TTL_SECS", Some(" 60 ".to_string()), 3600u64).unwrap(),
            60
        );
        let err = parse_value("CSRF_TOKEN_TTL_SECS", Some("1h".to_string()), 3600u64)
            .unwrap_err();
        assert!(err.to_string().contains("CSRF_TOKEN_TTL_SECS"));
        assert!(parse_value("REPORT_REASON_MIN_CHARS", Some("-1".to_string()), 10usize).is_err());
    }

    #[test]
    fn test_evidence_limit_overflow_is_rejected() {
        assert_eq!(mib_to_bytes(10).unwrap(), 10 * 1024 * 1024);
        assert!(mib_to_bytes(u64::MAX / 1024).is_err());
    }

    #[test]
    fn test_is_production_case_insensitive() {
        let config = Config(Box::new(test_config("Production")));
        assert!(config.is_production());
        let config = Config(Box::new(test_config("staging")));
        assert!(!config.is_production());
    }
}
