use crate::error::AppError;

/// Backend behind a database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    /// Classify a connection URL by scheme.
    pub fn from_url(url: &str) -> Result<Self, AppError> {
        let url = url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbKind::Postgres)
        } else if url == "sqlite::memory:" || url.starts_with("sqlite::memory:?") {
            Ok(DbKind::SqliteMemory)
        } else if url.starts_with("sqlite:") {
            Ok(DbKind::SqliteFile)
        } else {
            Err(AppError::config(format!(
                "Unsupported database URL scheme in '{}'",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }
}
