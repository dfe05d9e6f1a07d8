#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod auth;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod logging;
pub mod repos;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use adapters::documents_sea::SeaDocumentStore;
pub use auth::{IdentityProvider, StaticIdentity};
pub use config::app::AppConfig;
pub use domain::{resolve, GameRecord, TestReport, WorkStatus};
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use infra::db::{bootstrap_db, connect_db};
pub use state::{Access, Session};
pub use store::memory::MemoryStore;
pub use store::{Collection, DocumentStore};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
