//! Storeguard Infrastructure Library
//!
//! Shared infrastructure components used by the Storeguard server:
//! - CSRF token issue and verification
//! - Middleware (request ID, security headers)
//! - Telemetry initialization
//! - Error response shape

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{
    request_id_middleware, security_headers_middleware, CsrfError, CsrfProtection,
    CsrfTokenResponse, RequestId, SecurityHeadersConfig,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};

pub use error::ErrorResponse;
