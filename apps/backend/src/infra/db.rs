use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::DbKind;
use crate::error::AppError;

/// Open a connection pool for `url`. Does NOT run migrations.
///
/// In-memory SQLite is pinned to a single connection; every pooled
/// connection would otherwise see its own empty database.
pub async fn connect_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let kind = DbKind::from_url(url)?;

    let mut options = ConnectOptions::new(url.to_string());
    options
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if kind == DbKind::SqliteMemory {
        options.max_connections(1).min_connections(1);
    }

    let conn = Database::connect(options).await?;
    info!(kind = ?kind, "database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(url).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    Ok(conn)
}
