//! Report submission schema.
//!
//! [`RawReportInput`] carries its rules as `validator` attributes. Limits are runtime
//! configuration, so they reach the custom rules through a [`ReportLimits`] context.
//! Failures are rendered through the [`MessageCatalog`] in wire order.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use validator::{Validate, ValidateArgs, ValidationError};

use super::field_errors::{FieldError, RuleCode, ValidationErrors};
use super::messages::{Locale, MessageCatalog};

pub const STORE_ID_FIELD: &str = "storeId";
pub const REASON_FIELD: &str = "reason";
pub const EVIDENCE_FIELD: &str = "evidence";

/// Struct field name paired with its wire name, in reporting order.
const FIELD_ORDER: [(&str, &str); 3] = [
    ("store_id", STORE_ID_FIELD),
    ("reason", REASON_FIELD),
    ("evidence", EVIDENCE_FIELD),
];

pub const MIN_REASON_CHARS: usize = 10;
pub const MAX_REASON_CHARS: usize = 500;
/// 10 MiB
pub const MAX_EVIDENCE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_EVIDENCE_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// An uploaded evidence attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceFile {
    pub file_name: String,
    /// Media type as declared by the client
    pub content_type: String,
    #[serde(skip_serializing)]
    pub data: Bytes,
}

impl EvidenceFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Declared media type without parameters, lowercased.
    pub fn media_type(&self) -> String {
        normalize_media_type(&self.content_type)
    }
}

/// Limits the report rules are checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLimits {
    pub min_reason_chars: usize,
    pub max_reason_chars: usize,
    pub max_evidence_bytes: u64,
    /// Normalized media types
    pub allowed_content_types: Vec<String>,
}

/// Untrusted submission as read from the form. Unknown fields never reach this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
#[validate(context = ReportLimits)]
pub struct RawReportInput {
    #[validate(required, custom(function = store_id_is_integer))]
    pub store_id: Option<String>,
    #[validate(required, custom(function = reason_length, use_context))]
    pub reason: Option<String>,
    #[validate(
        required,
        custom(function = evidence_size, use_context),
        custom(function = evidence_media_type, use_context)
    )]
    pub evidence: Option<EvidenceFile>,
}

impl RawReportInput {
    /// Build from `(name, value)` text fields plus an optional file. Names other than
    /// `storeId` and `reason` are ignored; a repeated name keeps the last value.
    pub fn from_fields<'a, I>(fields: I, evidence: Option<EvidenceFile>) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut input = RawReportInput {
            evidence,
            ..Default::default()
        };
        for (name, value) in fields {
            match name {
                STORE_ID_FIELD => input.store_id = Some(value.to_string()),
                REASON_FIELD => input.reason = Some(value.to_string()),
                _ => {}
            }
        }
        input
    }
}

/// A fully validated report submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSubmission {
    pub store_id: i64,
    pub reason: String,
    pub evidence: EvidenceFile,
}

/// Strip MIME parameters and lowercase (`Image/PNG; q=1` => `image/png`).
fn normalize_media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_ascii_lowercase()
}

/// Blank counts as absent; anything else must be a base-10 integer.
fn parse_store_id(raw: &str) -> Result<i64, RuleCode> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RuleCode::Required);
    }
    value.parse::<i64>().map_err(|_| RuleCode::InvalidType)
}

fn store_id_is_integer(raw: &str) -> Result<(), ValidationError> {
    parse_store_id(raw)
        .map(|_| ())
        .map_err(|code| ValidationError::new(code.as_str()))
}

/// Length in Unicode scalar values.
fn reason_length(reason: &str, limits: &ReportLimits) -> Result<(), ValidationError> {
    let count = reason.chars().count();
    if count < limits.min_reason_chars {
        let mut err = ValidationError::new(RuleCode::TooShort.as_str());
        err.add_param(Cow::from("min"), &limits.min_reason_chars);
        return Err(err);
    }
    if count > limits.max_reason_chars {
        let mut err = ValidationError::new(RuleCode::TooLong.as_str());
        err.add_param(Cow::from("max"), &limits.max_reason_chars);
        return Err(err);
    }
    Ok(())
}

fn evidence_size(evidence: &EvidenceFile, limits: &ReportLimits) -> Result<(), ValidationError> {
    if evidence.size() > limits.max_evidence_bytes {
        let mut err = ValidationError::new(RuleCode::TooLarge.as_str());
        err.add_param(Cow::from("max"), &limits.max_evidence_bytes);
        err.add_param(Cow::from("max_mb"), &(limits.max_evidence_bytes / 1024 / 1024));
        return Err(err);
    }
    Ok(())
}

fn evidence_media_type(
    evidence: &EvidenceFile,
    limits: &ReportLimits,
) -> Result<(), ValidationError> {
    let media_type = evidence.media_type();
    if !limits
        .allowed_content_types
        .iter()
        .any(|allowed| *allowed == media_type)
    {
        let mut err = ValidationError::new(RuleCode::UnsupportedType.as_str());
        err.add_param(Cow::from("accepted"), &limits.allowed_content_types.join(", "));
        return Err(err);
    }
    Ok(())
}

/// Report rules bound to their limits and message catalog.
#[derive(Debug, Clone)]
pub struct ReportSchema {
    limits: Arc<ReportLimits>,
    catalog: Arc<MessageCatalog>,
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self::new(
            MIN_REASON_CHARS,
            MAX_REASON_CHARS,
            MAX_EVIDENCE_BYTES,
            DEFAULT_EVIDENCE_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl ReportSchema {
    pub fn new(
        min_reason_chars: usize,
        max_reason_chars: usize,
        max_evidence_bytes: u64,
        allowed_content_types: Vec<String>,
    ) -> Self {
        let allowed_content_types = allowed_content_types
            .iter()
            .map(|ct| normalize_media_type(ct))
            .collect();

        Self {
            limits: Arc::new(ReportLimits {
                min_reason_chars,
                max_reason_chars,
                max_evidence_bytes,
                allowed_content_types,
            }),
            catalog: Arc::new(MessageCatalog::builtin()),
        }
    }

    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Validate every field independently and report all failures together.
    pub fn validate(
        &self,
        input: &RawReportInput,
        locale: Locale,
    ) -> Result<ReportSubmission, ValidationErrors> {
        if let Err(errors) = input.validate_with_args(self.limits.as_ref()) {
            return Err(self.localize(&errors, locale));
        }

        let store_id = input
            .store_id
            .as_deref()
            .and_then(|raw| parse_store_id(raw).ok());
        match (store_id, &input.reason, &input.evidence) {
            (Some(store_id), Some(reason), Some(evidence)) => Ok(ReportSubmission {
                store_id,
                reason: reason.clone(),
                evidence: evidence.clone(),
            }),
            // unreachable once the attribute rules pass
            _ => Err(ValidationErrors::new()),
        }
    }

    /// Flatten `validator` errors into wire order: fields as declared, then rule order.
    fn localize(&self, errors: &validator::ValidationErrors, locale: Locale) -> ValidationErrors {
        let by_field = errors.field_errors();
        let mut localized = ValidationErrors::new();

        for (name, wire_name) in FIELD_ORDER {
            let Some(field_errors) = by_field.get(name) else {
                continue;
            };
            let mut rendered: Vec<FieldError> = field_errors
                .iter()
                .filter_map(|error| {
                    let code = RuleCode::from_code(&error.code)?;
                    let message = self.catalog.render(locale, wire_name, error);
                    Some(FieldError::new(wire_name, code, message))
                })
                .collect();
            rendered.sort_by_key(|e| e.code);
            rendered.into_iter().for_each(|e| localized.push(e));
        }

        localized
    }
}
