//! Field errors as returned to the submitter.
//!
//! `validator` reports failures keyed by struct field; these types carry them in wire order
//! with a localized message attached.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a validation rule. Also the key into the message catalog.
///
/// Declaration order is the order errors are reported within one field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleCode {
    Required,
    InvalidType,
    TooShort,
    TooLong,
    TooLarge,
    UnsupportedType,
}

impl RuleCode {
    pub const ALL: [RuleCode; 6] = [
        RuleCode::Required,
        RuleCode::InvalidType,
        RuleCode::TooShort,
        RuleCode::TooLong,
        RuleCode::TooLarge,
        RuleCode::UnsupportedType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::Required => "required",
            RuleCode::InvalidType => "invalid_type",
            RuleCode::TooShort => "too_short",
            RuleCode::TooLong => "too_long",
            RuleCode::TooLarge => "too_large",
            RuleCode::UnsupportedType => "unsupported_type",
        }
    }

    /// Look up a `validator` error code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-scoped validation error as returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Field path, e.g. `storeId`
    pub field: String,
    pub code: RuleCode,
    /// Localized, user-facing message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: RuleCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// Ordered collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Errors reported against `field`, in rule order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    pub fn has(&self, field: &str, code: RuleCode) -> bool {
        self.for_field(field).any(|e| e.code == code)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.code)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
