//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; any `AppError` converts with `?` and renders
//! as an [`ErrorResponse`] with the status, code and logging level from `ErrorMetadata`.
//!
//! Bodies are rendered without details. [`error_details_middleware`] swaps in the detailed
//! body when the router is configured to expose it.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Request, State,
    },
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use storeguard_core::{AppError, ErrorMetadata, LogLevel};
use storeguard_infra::ErrorResponse;

/// Detailed body carried alongside the sanitized one.
#[derive(Debug, Clone)]
struct DetailedErrorBody(Arc<ErrorResponse>);

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: both the trait and `AppError` are foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body exceeds the upload limit".to_string())
        } else {
            AppError::BadRequest(format!("Failed to read multipart body: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, false);
        let mut response = (status, Json(body)).into_response();

        let detailed = ErrorResponse::from_app_error(app_error, true);
        if detailed.details.is_some() {
            response
                .extensions_mut()
                .insert(DetailedErrorBody(Arc::new(detailed)));
        }
        response
    }
}

/// Replace error bodies with their detailed form when `expose_details` is set.
pub async fn error_details_middleware(
    State(expose_details): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(DetailedErrorBody(detailed)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };
    if !expose_details {
        return response;
    }

    let Ok(bytes) = serde_json::to_vec(detailed.as_ref()) else {
        return response;
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeguard_core::{FieldError, RuleCode, ValidationErrors};

    #[test]
    fn test_validation_error_is_unprocessable() {
        let errors = ValidationErrors::from(vec![FieldError::new(
            "storeId",
            RuleCode::Required,
            "Please select a store",
        )]);
        let response = HttpAppError::from(AppError::Validation(errors)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_detailed_body_attached_for_non_sensitive_errors() {
        let response =
            HttpAppError::from(AppError::NotFound("Store 9 not found".to_string())).into_response();
        let detailed = response
            .extensions()
            .get::<DetailedErrorBody>()
            .expect("detailed body attached");
        assert_eq!(detailed.0.error_type.as_deref(), Some("NotFound"));
    }

    #[test]
    fn test_sensitive_errors_carry_no_detailed_body() {
        let response =
            HttpAppError::from(AppError::Internal("db at 10.0.0.3".to_string())).into_response();
        assert!(response.extensions().get::<DetailedErrorBody>().is_none());
    }

    #[test]
    fn test_csrf_rejection_is_forbidden() {
        let response =
            HttpAppError::from(AppError::CsrfRejected("mismatch".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_anyhow_becomes_internal() {
        let HttpAppError(app_err) = anyhow::anyhow!("store directory offline").into();
        match app_err {
            AppError::InternalWithSource { message, .. } => {
                assert_eq!(message, "store directory offline")
            }
            _ => panic!("Expected InternalWithSource variant"),
        }
    }
}
