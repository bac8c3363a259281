//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p storeguard-api`.

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::sync::Arc;
use storeguard_api::constants;
use storeguard_api::setup::routes;
use storeguard_api::{AppState, InMemoryReportRepository, InMemoryStoreDirectory};
use storeguard_core::{AppConfig, BaseConfig, Config, Locale};
use storeguard_infra::CsrfTokenResponse;

pub const TEST_CSRF_SECRET: &str = "integration-test-csrf-secret-0123456789";

/// Store ids known to the test directory.
pub const KNOWN_STORE_ID: i64 = 42;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
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
        csrf_secret: TEST_CSRF_SECRET.to_string(),
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
        known_store_ids: vec![1, KNOWN_STORE_ID],
    }))
}

/// Test application: server plus a handle on the report repository.
pub struct TestApp {
    pub server: TestServer,
    pub reports: Arc<InMemoryReportRepository>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Fetch a token and return `(token, cookie header value)`.
    pub async fn csrf(&self) -> (String, String) {
        let response = self.server.get(&api_path("/csrf-token")).await;
        assert_eq!(response.status_code(), 200);
        let body: CsrfTokenResponse = response.json();
        let cookie = format!("csrf-token={}", body.token);
        (body.token, cookie)
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_config(test_config()).await
}

pub async fn setup_test_app_with_config(config: Config) -> TestApp {
    let reports = Arc::new(InMemoryReportRepository::new());
    let stores = Arc::new(InMemoryStoreDirectory::new(
        config.known_store_ids().iter().copied(),
    ));
    let state = Arc::new(AppState::new(config.clone(), reports.clone(), stores));

    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp { server, reports }
}

/// A form with every field valid, carrying `token`.
pub fn valid_form(token: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("storeId", KNOWN_STORE_ID.to_string())
        .add_text("reason", "Store sells counterfeit electronics")
        .add_text("csrfToken", token)
        .add_part(
            "evidence",
            Part::bytes(fixtures::create_minimal_png())
                .file_name("receipt.png")
                .mime_type("image/png"),
        )
}
