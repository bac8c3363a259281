//! OpenAPI documentation.

use axum::Json;
use utoipa::OpenApi;

use crate::handlers;
use storeguard_core::models;
use storeguard_core::validation::{FieldError, RuleCode};
use storeguard_infra::{CsrfTokenResponse, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storeguard API",
        version = "0.1.0",
        description = "Store report submission API (v0). Submissions are protected by a double-submit CSRF token and validated in one pass; validation messages are localized (th, en)."
    ),
    paths(
        handlers::csrf_token::issue_csrf_token,
        handlers::reports::submit_report,
    ),
    components(
        schemas(
            CsrfTokenResponse,
            ErrorResponse,
            FieldError,
            RuleCode,
            models::ReportResponse,
            models::EvidenceMetadata,
            models::ReportStatus,
        )
    ),
    tags(
        (name = "csrf", description = "Anti-forgery tokens for form submissions"),
        (name = "reports", description = "Store report submission")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
