//! HTTP error response body
//!
//! `IntoResponse` for `AppError` lives in the API crate: the orphan rule forbids
//! implementing axum's trait for a `storeguard_core` type here.

use serde::{Deserialize, Serialize};
use storeguard_core::{AppError, ErrorMetadata, FieldError};
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Field-level errors, present only for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    /// Build the body for `error`. Details are only attached when `expose_details` is set
    /// and the error is not sensitive.
    pub fn from_app_error(error: &AppError, expose_details: bool) -> Self {
        let show_details = expose_details && !error.is_sensitive();
        let errors = match error {
            AppError::Validation(field_errors) => field_errors.iter().cloned().collect(),
            _ => Vec::new(),
        };

        Self {
            error: error.client_message(),
            details: show_details.then(|| error.detailed_message()),
            error_type: show_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
            errors,
        }
    }
}
