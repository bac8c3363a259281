//! Data models for the application
//!
//! Each sub-module represents a specific feature area.

mod report;

pub use report::{EvidenceMetadata, Report, ReportResponse, ReportStatus};
