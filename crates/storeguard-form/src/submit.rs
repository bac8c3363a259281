//! Report submission client.

use std::sync::Arc;

use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use storeguard_core::models::ReportResponse;
use storeguard_core::validation::{EVIDENCE_FIELD, REASON_FIELD, STORE_ID_FIELD};
use storeguard_core::{EvidenceFile, FieldError, Locale, RawReportInput, ReportSchema};

use crate::error::FormError;
use crate::hidden_field::CSRF_FIELD_NAME;
use crate::provider::CsrfTokenProvider;

const REPORTS_PATH: &str = "/api/v0/reports";

/// Form values as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub store_id: String,
    pub reason: String,
    pub evidence: Option<EvidenceFile>,
}

impl ReportDraft {
    fn to_raw_input(&self) -> RawReportInput {
        RawReportInput::from_fields(
            [
                (STORE_ID_FIELD, self.store_id.as_str()),
                (REASON_FIELD, self.reason.as_str()),
            ],
            self.evidence.clone(),
        )
    }
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Submits report forms. Refuses to send anything while the provider holds no token.
pub struct ReportFormClient {
    client: Client,
    base_url: String,
    provider: Arc<CsrfTokenProvider>,
    locale: Locale,
    local_schema: Option<ReportSchema>,
}

impl ReportFormClient {
    /// `client` must be the one the provider's token source uses, so the cookie is shared.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        provider: Arc<CsrfTokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider,
            locale: Locale::default(),
            local_schema: None,
        }
    }

    /// Locale requested for server-side validation messages.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Validate locally before sending; invalid drafts never leave the client.
    pub fn with_local_validation(mut self, schema: ReportSchema) -> Self {
        self.local_schema = Some(schema);
        self
    }

    pub fn provider(&self) -> &CsrfTokenProvider {
        &self.provider
    }

    pub async fn submit(&self, draft: &ReportDraft) -> Result<ReportResponse, FormError> {
        let token = self.provider.token().ok_or_else(|| {
            tracing::warn!(
                loading = self.provider.is_loading(),
                "Blocked report submission without CSRF token"
            );
            FormError::TokenUnavailable
        })?;

        if let Some(schema) = &self.local_schema {
            schema
                .validate(&draft.to_raw_input(), self.locale)
                .map_err(FormError::Validation)?;
        }

        let mut form = multipart::Form::new()
            .text(STORE_ID_FIELD, draft.store_id.clone())
            .text(REASON_FIELD, draft.reason.clone())
            .text(CSRF_FIELD_NAME, token);
        if let Some(evidence) = &draft.evidence {
            let part = multipart::Part::bytes(evidence.data.to_vec())
                .file_name(evidence.file_name.clone())
                .mime_str(&evidence.content_type)?;
            form = form.part(EVIDENCE_FIELD, part);
        }

        let response = self
            .client
            .post(format!("{}{}", self.base_url, REPORTS_PATH))
            .header(reqwest::header::ACCEPT_LANGUAGE, self.locale.as_str())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).map_err(|_| {
            FormError::InvalidResponse(format!(
                "report submission failed with status {}: {}",
                status, text
            ))
        })?;

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(FormError::Validation(body.errors.into()));
        }
        if status == StatusCode::FORBIDDEN {
            // The token expired or the cookie was lost; the next attempt needs a new one.
            self.provider.refresh();
        }
        Err(FormError::Rejected {
            status: status.as_u16(),
            code: body.code,
            message: body.error,
        })
    }
}
