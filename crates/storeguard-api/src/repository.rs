//! Persistence collaborators for the report handler.
//!
//! The handler only sees the traits. The in-memory implementations back the default server
//! and the integration tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use storeguard_core::{models::Report, AppError};
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a new report and return the stored record.
    async fn create(&self, report: Report) -> Result<Report, AppError>;
}

#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn exists(&self, store_id: i64) -> Result<bool, AppError>;
}

#[derive(Debug, Default)]
pub struct InMemoryReportRepository {
    reports: RwLock<HashMap<Uuid, Report>>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<Report> {
        self.reports.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create(&self, report: Report) -> Result<Report, AppError> {
        let mut reports = self.reports.write().await;
        if reports.contains_key(&report.id) {
            return Err(AppError::Internal(format!(
                "Report {} already exists",
                report.id
            )));
        }
        reports.insert(report.id, report.clone());
        Ok(report)
    }
}

/// Store directory backed by a fixed set of ids.
///
/// A permissive directory reports every positive id as existing.
#[derive(Debug, Default)]
pub struct InMemoryStoreDirectory {
    ids: RwLock<HashSet<i64>>,
    permissive: bool,
}

impl InMemoryStoreDirectory {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
            permissive: false,
        }
    }

    pub fn permissive() -> Self {
        Self {
            ids: RwLock::default(),
            permissive: true,
        }
    }

    pub async fn insert(&self, store_id: i64) {
        self.ids.write().await.insert(store_id);
    }
}

#[async_trait]
impl StoreDirectory for InMemoryStoreDirectory {
    async fn exists(&self, store_id: i64) -> Result<bool, AppError> {
        if self.permissive {
            return Ok(store_id > 0);
        }
        Ok(self.ids.read().await.contains(&store_id))
    }
}
