//! Report form extraction from a multipart body

use axum::extract::Multipart;
use storeguard_core::validation::{EVIDENCE_FIELD, REASON_FIELD, STORE_ID_FIELD};
use storeguard_core::{AppError, EvidenceFile, RawReportInput};
use storeguard_infra::middleware::CSRF_FORM_FIELD;

use crate::error::HttpAppError;

/// Untyped report form plus the submitted anti-forgery token.
#[derive(Debug, Default)]
pub struct ReportForm {
    pub input: RawReportInput,
    pub csrf_token: Option<String>,
}

/// Read the multipart body into a [`ReportForm`].
///
/// Unknown parts are skipped. A file part with neither a file name nor content (a browser's
/// empty file input) counts as no evidence. More than one evidence file is rejected.
pub async fn read_report_form(mut multipart: Multipart) -> Result<ReportForm, HttpAppError> {
    let mut text_fields: Vec<(String, String)> = Vec::new();
    let mut evidence: Option<EvidenceFile> = None;
    let mut csrf_token: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            EVIDENCE_FIELD => {
                let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await?;

                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                if evidence.is_some() {
                    return Err(AppError::BadRequest(
                        "Multiple evidence files are not allowed; attach exactly one".to_string(),
                    )
                    .into());
                }
                evidence = Some(EvidenceFile::new(file_name, content_type, data));
            }
            CSRF_FORM_FIELD => csrf_token = Some(field.text().await?),
            STORE_ID_FIELD | REASON_FIELD => {
                let value = field.text().await?;
                text_fields.push((field_name, value));
            }
            _ => {
                tracing::debug!(field = %field_name, "Ignoring unknown form field");
            }
        }
    }

    let input = RawReportInput::from_fields(
        text_fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        evidence,
    );

    Ok(ReportForm { input, csrf_token })
}
