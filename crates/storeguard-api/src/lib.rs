//! Storeguard API Library
//!
//! HTTP handlers, application state, and setup for the store report service.

pub mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod repository;
pub mod setup;
pub mod state;
mod utils;

// Re-exports
pub use error::HttpAppError;
pub use repository::{
    InMemoryReportRepository, InMemoryStoreDirectory, ReportRepository, StoreDirectory,
};
pub use state::AppState;
