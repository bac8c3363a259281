//! Shared HTTP middleware for Storeguard services

pub mod csrf;
pub mod request_id;
pub mod security_headers;

pub use csrf::{
    cookie_token, header_token, CsrfError, CsrfProtection, CsrfTokenResponse, CSRF_COOKIE_NAME,
    CSRF_FORM_FIELD, CSRF_HEADER_NAME,
};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
