//! Configuration: environment, database URL, admin allow-list.

pub mod admin_allowlist;
pub mod app;
pub mod db;

pub use admin_allowlist::{normalize_email, AdminAllowlist};
pub use app::AppConfig;
pub use db::DbKind;
