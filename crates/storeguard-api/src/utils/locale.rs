use axum::http::{header, HeaderMap};
use storeguard_core::Locale;

/// Locale for validation messages, from `Accept-Language` or the configured default.
pub fn negotiate_locale(headers: &HeaderMap, default: Locale) -> Locale {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .and_then(Locale::negotiate)
        .unwrap_or(default)
}
