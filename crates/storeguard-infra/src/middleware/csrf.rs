//! CSRF (Cross-Site Request Forgery) protection
//!
//! Stateless double-submit cookie pattern. The server issues a signed token both in the
//! response body and in the `csrf-token` cookie; a state-changing request must echo the
//! token (form field or `X-CSRF-Token` header) and it must match the cookie.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const CSRF_COOKIE_NAME: &str = "csrf-token";
pub const CSRF_HEADER_NAME: &str = "X-CSRF-Token";
/// Name of the hidden form field carrying the token.
pub const CSRF_FORM_FIELD: &str = "csrfToken";

/// Tolerated clock skew for tokens stamped slightly in the future.
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// CSRF token response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CsrfTokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    #[error("no CSRF token submitted")]
    MissingToken,
    #[error("no csrf-token cookie present")]
    MissingCookie,
    #[error("submitted token does not match the cookie")]
    Mismatch,
    #[error("malformed CSRF token")]
    Malformed,
    #[error("CSRF token expired")]
    Expired,
    #[error("CSRF token signature invalid")]
    BadSignature,
}

/// Issues and verifies signed CSRF tokens.
///
/// Token format: `<hmac>.<timestamp>.<nonce>` where the HMAC-SHA256 covers
/// `<timestamp>.<nonce>`.
#[derive(Clone)]
pub struct CsrfProtection {
    secret: String,
    ttl_secs: u64,
    secure_cookie: bool,
}

impl std::fmt::Debug for CsrfProtection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfProtection")
            .field("ttl_secs", &self.ttl_secs)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl CsrfProtection {
    pub fn new(secret: impl Into<String>, ttl_secs: u64, secure_cookie: bool) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
            secure_cookie,
        }
    }

    fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Generate a fresh token stamped with the current time.
    pub fn generate_token(&self) -> String {
        self.generate_token_at(unix_now())
    }

    fn generate_token_at(&self, timestamp: u64) -> String {
        let nonce = Uuid::new_v4().to_string();
        let message = format!("{}.{}", timestamp, nonce);
        format!("{}.{}", self.sign(&message), message)
    }

    /// Check format, expiry and signature of `token`.
    pub fn verify_token(&self, token: &str) -> Result<(), CsrfError> {
        self.verify_token_at(token, unix_now())
    }

    fn verify_token_at(&self, token: &str, now: u64) -> Result<(), CsrfError> {
        let mut parts = token.splitn(3, '.');
        let (Some(hmac_part), Some(timestamp_str), Some(nonce)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CsrfError::Malformed);
        };
        if nonce.is_empty() || nonce.contains('.') {
            return Err(CsrfError::Malformed);
        }

        let timestamp: u64 = timestamp_str.parse().map_err(|_| CsrfError::Malformed)?;
        if timestamp > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return Err(CsrfError::Malformed);
        }
        if timestamp.saturating_add(self.ttl_secs) < now {
            tracing::debug!("CSRF token expired");
            return Err(CsrfError::Expired);
        }

        let expected = self.sign(&format!("{}.{}", timestamp, nonce));
        if bool::from(expected.as_bytes().ct_eq(hmac_part.as_bytes())) {
            Ok(())
        } else {
            Err(CsrfError::BadSignature)
        }
    }

    /// Double-submit check: `submitted` must equal the cookie token and carry a valid
    /// signature.
    pub fn verify_submission(
        &self,
        submitted: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<(), CsrfError> {
        let submitted = submitted
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CsrfError::MissingToken)?;
        let cookie = cookie_token(headers).ok_or(CsrfError::MissingCookie)?;

        if !bool::from(submitted.as_bytes().ct_eq(cookie.as_bytes())) {
            return Err(CsrfError::Mismatch);
        }
        self.verify_token(submitted)
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn cookie_value(&self, token: &str) -> String {
        let secure_flag = if self.secure_cookie { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; SameSite=Strict; HttpOnly; Max-Age={}{}",
            CSRF_COOKIE_NAME, token, self.ttl_secs, secure_flag
        )
    }

    /// Issue a new token as a JSON body plus the matching cookie.
    pub fn issue(&self) -> Response {
        let token = self.generate_token();
        let cookie = self.cookie_value(&token);
        (
            StatusCode::OK,
            [
                (header::SET_COOKIE, cookie),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
            Json(CsrfTokenResponse { token }),
        )
            .into_response()
    }
}

/// Token from the `csrf-token` cookie, if any.
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Token from the `X-CSRF-Token` header, if any.
pub fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER_NAME)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn csrf() -> CsrfProtection {
        CsrfProtection::new("test-secret", 3600, false)
    }

    fn with_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; csrf-token={}; lang=th", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_generate_token_format() {
        let token = csrf().generate_token();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        // hex-encoded SHA-256
        assert_eq!(parts[0].len(), 64);
        assert!(parts[1].parse::<u64>().unwrap() > 0);
    }

    #[test]
    fn test_verify_token_valid() {
        let csrf = csrf();
        let token = csrf.generate_token();
        assert_eq!(csrf.verify_token(&token), Ok(()));
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let token = csrf().generate_token();
        let other = CsrfProtection::new("different-secret", 3600, false);
        assert_eq!(other.verify_token(&token), Err(CsrfError::BadSignature));
    }

    #[test]
    fn test_verify_token_invalid_format() {
        let csrf = csrf();
        assert_eq!(csrf.verify_token("abc.123"), Err(CsrfError::Malformed));
        assert_eq!(csrf.verify_token("invalid"), Err(CsrfError::Malformed));
        assert_eq!(csrf.verify_token("abc.notanumber.n"), Err(CsrfError::Malformed));
        assert_eq!(csrf.verify_token("a.1.b.c"), Err(CsrfError::Malformed));
    }

    #[test]
    fn test_verify_token_expired() {
        let csrf = csrf();
        let now = unix_now();
        let token = csrf.generate_token_at(now - 3601);
        assert_eq!(csrf.verify_token_at(&token, now), Err(CsrfError::Expired));

        let token = csrf.generate_token_at(now - 3600);
        assert_eq!(csrf.verify_token_at(&token, now), Ok(()));
    }

    #[test]
    fn test_verify_token_from_future_rejected() {
        let csrf = csrf();
        let now = unix_now();
        let token = csrf.generate_token_at(now + 3600);
        assert_eq!(csrf.verify_token_at(&token, now), Err(CsrfError::Malformed));
    }

    #[test]
    fn test_tampered_timestamp_rejected() {
        let csrf = csrf();
        let token = csrf.generate_token();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = (parts[1].parse::<u64>().unwrap() - 1).to_string();
        assert_eq!(csrf.verify_token(&parts.join(".")), Err(CsrfError::BadSignature));
    }

    #[test]
    fn test_verify_submission_double_submit() {
        let csrf = csrf();
        let token = csrf.generate_token();

        assert_eq!(csrf.verify_submission(Some(&token), &with_cookie(&token)), Ok(()));
        assert_eq!(
            csrf.verify_submission(None, &with_cookie(&token)),
            Err(CsrfError::MissingToken)
        );
        assert_eq!(
            csrf.verify_submission(Some("  "), &with_cookie(&token)),
            Err(CsrfError::MissingToken)
        );
        assert_eq!(
            csrf.verify_submission(Some(&token), &HeaderMap::new()),
            Err(CsrfError::MissingCookie)
        );

        let other = csrf.generate_token();
        assert_eq!(
            csrf.verify_submission(Some(&other), &with_cookie(&token)),
            Err(CsrfError::Mismatch)
        );
    }

    #[test]
    fn test_cookie_value_flags() {
        let cookie = csrf().cookie_value("tok");
        assert!(cookie.starts_with("csrf-token=tok; Path=/; SameSite=Strict; HttpOnly"));
        assert!(!cookie.contains("Secure"));

        let secure = CsrfProtection::new("s", 60, true).cookie_value("tok");
        assert!(secure.ends_with("; Secure"));
        assert!(secure.contains("Max-Age=60"));
    }

    #[test]
    fn test_header_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_token(&headers), None);
        headers.insert(CSRF_HEADER_NAME, HeaderValue::from_static("abc"));
        assert_eq!(header_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_issue_sets_cookie_matching_body() {
        let response = csrf().issue();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("csrf-token="));
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }
}
