//! Validation modules
//!
//! - [`field_errors`]: rule codes and the field errors returned to the submitter
//! - [`messages`]: locale-keyed message catalog
//! - [`report`]: the report submission schema

pub mod field_errors;
pub mod messages;
pub mod report;

pub use field_errors::{FieldError, RuleCode, ValidationErrors};
pub use messages::{Locale, MessageCatalog};
pub use report::{
    EvidenceFile, RawReportInput, ReportLimits, ReportSchema, ReportSubmission,
    DEFAULT_EVIDENCE_CONTENT_TYPES, EVIDENCE_FIELD, MAX_EVIDENCE_BYTES, MAX_REASON_CHARS,
    MIN_REASON_CHARS, REASON_FIELD, STORE_ID_FIELD,
};
