//! Storeguard Form Library
//!
//! Client-side collaborators of the report form:
//! - [`CsrfTokenProvider`]: per-form token acquisition with loading state, retry and
//!   cancellation
//! - [`render_hidden_field`]: the hidden `csrfToken` input
//! - [`ReportFormClient`]: fail-closed multipart submission

pub mod error;
pub mod hidden_field;
pub mod provider;
pub mod source;
pub mod submit;

pub use error::FormError;
pub use hidden_field::{render_hidden_field, CSRF_FIELD_NAME};
pub use provider::{CsrfTokenProvider, RetryPolicy, TokenState};
pub use source::{build_http_client, HttpTokenSource, TokenSource};
pub use submit::{ReportDraft, ReportFormClient};
