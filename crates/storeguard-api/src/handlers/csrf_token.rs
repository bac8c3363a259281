use std::sync::Arc;

use axum::{extract::State, response::Response};
use storeguard_infra::CsrfTokenResponse;

use crate::state::AppState;

/// Issue a CSRF token for a report form.
///
/// The same token is returned in the body and set as the `csrf-token` cookie; a
/// submission must echo the body value.
#[utoipa::path(
    get,
    path = "/api/v0/csrf-token",
    tag = "csrf",
    responses(
        (status = 200, description = "Fresh CSRF token", body = CsrfTokenResponse,
            headers(("Set-Cookie" = String, description = "csrf-token cookie carrying the same token")))
    )
)]
pub async fn issue_csrf_token(State(state): State<Arc<AppState>>) -> Response {
    tracing::debug!("Issuing CSRF token");
    state.csrf.issue()
}
