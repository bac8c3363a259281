use storeguard_core::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// No CSRF token is held; the submission was not sent.
    #[error("No CSRF token available; submission blocked")]
    TokenUnavailable,

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Server rejected the request with status {status} ({code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}

impl FormError {
    /// Field errors, when the failure is a validation failure (local or from the server).
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            FormError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
