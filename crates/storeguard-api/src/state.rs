//! Application state shared by all handlers.

use std::sync::Arc;

use storeguard_core::{Config, ReportSchema};
use storeguard_infra::CsrfProtection;

use crate::repository::{ReportRepository, StoreDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub schema: ReportSchema,
    pub csrf: CsrfProtection,
    pub reports: Arc<dyn ReportRepository>,
    pub stores: Arc<dyn StoreDirectory>,
}

impl AppState {
    /// Build state from configuration with the given collaborators.
    pub fn new(
        config: Config,
        reports: Arc<dyn ReportRepository>,
        stores: Arc<dyn StoreDirectory>,
    ) -> Self {
        let csrf = CsrfProtection::new(
            config.csrf_secret(),
            config.csrf_token_ttl_secs(),
            config.is_production(),
        );
        Self {
            schema: config.report_schema(),
            csrf,
            reports,
            stores,
            config,
        }
    }
}
