//! Collaborator wiring

use std::sync::Arc;

use storeguard_core::Config;

use crate::repository::{InMemoryReportRepository, InMemoryStoreDirectory, StoreDirectory};
use crate::state::AppState;

/// Build the application state with in-memory persistence.
pub fn initialize_state(config: &Config) -> Arc<AppState> {
    let stores: Arc<dyn StoreDirectory> = if config.known_store_ids().is_empty() {
        tracing::warn!("KNOWN_STORE_IDS not set - every positive store id will be accepted");
        Arc::new(InMemoryStoreDirectory::permissive())
    } else {
        tracing::info!(
            store_count = config.known_store_ids().len(),
            "Store directory seeded"
        );
        Arc::new(InMemoryStoreDirectory::new(
            config.known_store_ids().iter().copied(),
        ))
    };

    Arc::new(AppState::new(
        config.clone(),
        Arc::new(InMemoryReportRepository::new()),
        stores,
    ))
}
