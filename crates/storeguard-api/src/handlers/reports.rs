use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use storeguard_core::models::{Report, ReportResponse};
use storeguard_core::AppError;
use storeguard_infra::middleware::header_token;
use storeguard_infra::ErrorResponse;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::locale::negotiate_locale;
use crate::utils::multipart::read_report_form;

/// Submit a store report.
///
/// Order of checks: CSRF token, field validation (all errors at once), store existence.
#[utoipa::path(
    post,
    path = "/api/v0/reports",
    tag = "reports",
    params(
        ("Accept-Language" = Option<String>, Header, description = "Locale for validation messages: th (default) or en"),
        ("X-CSRF-Token" = Option<String>, Header, description = "CSRF token, when not sent as the csrfToken form field")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: storeId, reason, evidence (file), csrfToken"),
    responses(
        (status = 201, description = "Report accepted", body = ReportResponse),
        (status = 400, description = "Malformed multipart body", body = ErrorResponse),
        (status = 403, description = "Missing or invalid CSRF token", body = ErrorResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 422, description = "Validation failed; `errors` lists every field error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ReportResponse>), HttpAppError> {
    let form = read_report_form(multipart?).await?;

    // A blank form field defers to the header
    let submitted_token = form
        .csrf_token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| header_token(&headers));
    if let Err(e) = state
        .csrf
        .verify_submission(submitted_token.as_deref(), &headers)
    {
        tracing::warn!(reason = %e, "Rejected report submission: CSRF check failed");
        return Err(AppError::CsrfRejected(e.to_string()).into());
    }

    let locale = negotiate_locale(&headers, state.config.default_locale());
    let submission = state.schema.validate(&form.input, locale).map_err(|errors| {
        tracing::debug!(
            error_count = errors.len(),
            errors = %errors,
            locale = %locale,
            "Report validation failed"
        );
        AppError::Validation(errors)
    })?;

    if !state.stores.exists(submission.store_id).await? {
        return Err(AppError::NotFound(format!("Store {} not found", submission.store_id)).into());
    }

    let report = state
        .reports
        .create(Report::from_submission(&submission))
        .await?;

    tracing::info!(
        report_id = %report.id,
        store_id = report.store_id,
        evidence_bytes = report.evidence.size_bytes,
        content_type = %report.evidence.content_type,
        "Report accepted"
    );

    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}
