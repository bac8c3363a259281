//! API constants
//!
//! Routes and OpenAPI path annotations are versioned under `/api/v0`.

/// Versioned prefix for every API route
pub const API_PREFIX: &str = "/api/v0";

/// Room for the text parts and multipart framing on top of the evidence size limit.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
