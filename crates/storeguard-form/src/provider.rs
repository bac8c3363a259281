//! Per-form CSRF token provider.
//!
//! A provider is created when a form mounts and owns at most one in-flight fetch. State is
//! published on a `watch` channel: `Loading` until the fetch settles, then `Ready(token)` or
//! `Unavailable`. Disposing (or dropping) the provider cancels the fetch; a cancelled fetch
//! never publishes its result.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::hidden_field::render_hidden_field;
use crate::source::TokenSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Loading,
    Ready(String),
    /// Acquisition failed or the provider was disposed. Forms must not submit.
    Unavailable,
}

impl TokenState {
    pub fn is_loading(&self) -> bool {
        matches!(self, TokenState::Loading)
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            TokenState::Ready(token) => Some(token),
            _ => None,
        }
    }
}

/// Attempts and backoff for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }
}

pub struct CsrfTokenProvider {
    source: Arc<dyn TokenSource>,
    policy: RetryPolicy,
    state: Arc<watch::Sender<TokenState>>,
    /// Cancelled on dispose; parent of every fetch token.
    lifetime: CancellationToken,
    current_fetch: Mutex<CancellationToken>,
}

impl std::fmt::Debug for CsrfTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfTokenProvider")
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .field("disposed", &self.lifetime.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl CsrfTokenProvider {
    /// Create a provider and start fetching immediately.
    ///
    /// Must be called within a Tokio runtime.
    pub fn spawn(source: Arc<dyn TokenSource>, policy: RetryPolicy) -> Self {
        let lifetime = CancellationToken::new();
        let (state, _) = watch::channel(TokenState::Loading);
        let provider = Self {
            source,
            policy,
            state: Arc::new(state),
            current_fetch: Mutex::new(lifetime.child_token()),
            lifetime,
        };
        provider.start_fetch();
        provider
    }

    pub fn state(&self) -> TokenState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<TokenState> {
        self.state.subscribe()
    }

    /// The hidden input for the current state; empty while loading or unavailable.
    pub fn hidden_field(&self) -> String {
        render_hidden_field(self.state.borrow().token())
    }

    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Wait until the current acquisition settles and return the token, if any.
    pub async fn wait_ready(&self) -> Option<String> {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|state| !state.is_loading()).await;
        match settled {
            Ok(state) => state.token().map(str::to_string),
            Err(_) => None,
        }
    }

    /// Drop the current token and fetch a new one. No-op once disposed.
    pub fn refresh(&self) {
        if self.is_disposed() {
            return;
        }
        self.start_fetch();
    }

    /// Cancel any in-flight fetch and forget the token. Idempotent.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        // Cancel under the channel lock so no fetch can publish between the two steps.
        self.state.send_modify(|current| {
            self.lifetime.cancel();
            *current = TokenState::Unavailable;
        });
        tracing::debug!("CSRF token provider disposed");
    }

    fn start_fetch(&self) {
        let fetch = self.lifetime.child_token();
        // The superseded fetch is cancelled under the channel lock, so it publishes either
        // before Loading or not at all.
        self.state.send_modify(|state| {
            let mut current = self
                .current_fetch
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, fetch.clone()).cancel();
            *state = TokenState::Loading;
        });

        let source = self.source.clone();
        let state = self.state.clone();
        let policy = self.policy;

        tokio::spawn(async move {
            let token = tokio::select! {
                biased;
                _ = fetch.cancelled() => {
                    tracing::debug!("CSRF token fetch cancelled");
                    return;
                }
                token = fetch_with_retry(source.as_ref(), policy) => token,
            };

            let next = match token {
                Some(token) => TokenState::Ready(token),
                None => TokenState::Unavailable,
            };
            // dispose and refresh cancel while holding the same lock
            state.send_if_modified(|current| {
                if fetch.is_cancelled() {
                    return false;
                }
                *current = next;
                true
            });
        });
    }
}

impl Drop for CsrfTokenProvider {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

async fn fetch_with_retry(source: &dyn TokenSource, policy: RetryPolicy) -> Option<String> {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match source.fetch_token().await {
            Ok(token) if !token.is_empty() => return Some(token),
            Ok(_) => tracing::warn!(attempt, "CSRF token source returned an empty token"),
            Err(e) => tracing::warn!(attempt, error = %e, "CSRF token fetch failed"),
        }
        if attempt < max_attempts {
            tokio::time::sleep(policy.backoff(attempt)).await;
        }
    }
    tracing::warn!(max_attempts, "CSRF token unavailable; form submission blocked");
    None
}
