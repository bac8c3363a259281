//! Where CSRF tokens come from.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::FormError;

const CSRF_TOKEN_PATH: &str = "/api/v0/csrf-token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of anti-forgery tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, FormError>;
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

/// HTTP client with a cookie jar. Share one instance between the token source and the
/// submission client so the `csrf-token` cookie travels with the submission.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, FormError> {
    let client = Client::builder()
        .cookie_store(true)
        .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
        .build()?;
    Ok(client)
}

/// Fetches tokens from the same-origin `/api/v0/csrf-token` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenSource {
    client: Client,
    base_url: String,
}

impl HttpTokenSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, CSRF_TOKEN_PATH)
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<String, FormError> {
        let response = self.client.get(self.url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FormError::InvalidResponse(format!(
                "token request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: TokenBody = response.json().await?;
        if body.token.is_empty() {
            return Err(FormError::InvalidResponse(
                "token endpoint returned an empty token".to_string(),
            ));
        }
        Ok(body.token)
    }
}
