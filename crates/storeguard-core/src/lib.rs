//! Storeguard Core Library
//!
//! This crate provides the domain models, error types, configuration, and the report
//! validation schema shared by the API server and the form client.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use validation::{
    EvidenceFile, FieldError, Locale, MessageCatalog, RawReportInput, ReportSchema,
    ReportSubmission, RuleCode, ValidationErrors,
};
