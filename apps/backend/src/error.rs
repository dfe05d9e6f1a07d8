use thiserror::Error;

use crate::errors::{DomainError, ErrorCode};

/// Top-level error used by the binary and by process-wide setup
/// (configuration, database connection, migrations).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{code}: {detail}")]
    Domain {
        code: ErrorCode,
        detail: String,
        #[source]
        source: DomainError,
    },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Error code for any variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Domain { code, .. } => *code,
            AppError::Db { .. } => ErrorCode::StoreError,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Process exit status for the CLI: 2 for caller mistakes, 3 for missing
    /// or conflicting data, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Domain { source, .. } => match source {
                DomainError::Validation(..) | DomainError::Refused(..) => 2,
                DomainError::NotFound(..) | DomainError::Conflict(..) => 3,
                DomainError::Infra(..) => 1,
            },
            AppError::Config { .. } => 2,
            AppError::Db { .. } | AppError::Internal { .. } => 1,
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::Domain {
            code: e.code(),
            detail: e.detail().to_string(),
            source: e,
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::db(format!("db error: {e}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::internal(format!("io error: {e}"))
    }
}
