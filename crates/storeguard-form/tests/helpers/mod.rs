//! Test helpers: scripted token sources and an in-process API server.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use storeguard_api::setup::routes;
use storeguard_api::{AppState, InMemoryReportRepository, InMemoryStoreDirectory};
use storeguard_core::{AppConfig, BaseConfig, Config, Locale};
use storeguard_form::{FormError, TokenSource};

pub const KNOWN_STORE_ID: i64 = 42;

/// Token source replaying a fixed script of outcomes, one per call.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<String, String>>>,
    delay: Duration,
    calls: AtomicUsize,
    completed: AtomicBool,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
        Self::with_delay(script, Duration::ZERO)
    }

    pub fn with_delay(script: Vec<Result<&str, &str>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(String::from).map_err(String::from))
                    .collect(),
            ),
            delay,
            calls: AtomicUsize::new(0),
            completed: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether any fetch ran to completion.
    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for ScriptedSource {
    async fn fetch_token(&self) -> Result<String, FormError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));
        self.completed.store(true, Ordering::SeqCst);
        next.map_err(FormError::InvalidResponse)
    }
}

pub fn test_config() -> Config {
    Config(Box::new(AppConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            service_name: "storeguard-api".to_string(),
            service_version: "test".to_string(),
        },
        csrf_secret: "form-client-test-secret-0123456789abcdef".to_string(),
        csrf_secret_configured: true,
        csrf_token_ttl_secs: 3600,
        reason_min_chars: 10,
        reason_max_chars: 500,
        max_evidence_size_bytes: 10 * 1024 * 1024,
        evidence_allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "application/pdf".to_string(),
        ],
        default_locale: Locale::Th,
        known_store_ids: vec![KNOWN_STORE_ID],
    }))
}

pub struct TestServer {
    pub base_url: String,
    pub reports: Arc<InMemoryReportRepository>,
}

/// Serve the real router on an ephemeral local port.
pub async fn start_server() -> TestServer {
    let config = test_config();
    let reports = Arc::new(InMemoryReportRepository::new());
    let stores = Arc::new(InMemoryStoreDirectory::new([KNOWN_STORE_ID]));
    let state = Arc::new(AppState::new(config.clone(), reports.clone(), stores));
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        reports,
    }
}
