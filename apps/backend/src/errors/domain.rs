//! Domain-level error type used across services, repos and stores.
//!
//! This error type is storage-agnostic. Store implementations report
//! `StoreError`, which `infra::store_errors::map_store_err` translates into
//! `DomainError`; the CLI converts into `crate::error::AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::ErrorCode;

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    StoreUnavailable,
    DataCorruption,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    TestReport,
    Comment,
    ConfigRecord,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    OptimisticLock,
    Other(String),
}

/// Input validation failures; always raised before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    EmptyText,
    MalformedJson,
    NotAnObject,
    InvalidEmail,
    UnsupportedKind,
    Other(String),
}

/// Operations refused because an invariant or ownership rule protects the target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RefusalKind {
    ArchivedDeleteProtected,
    NotSignedIn,
    Banned,
    NotAuthor,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation failure
    Validation(ValidationKind, String),
    /// Explicit refusal (distinct from a transport failure)
    Refused(RefusalKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Refused(kind, d) => write!(f, "refused {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn refused(kind: RefusalKind, detail: impl Into<String>) -> Self {
        Self::Refused(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Stable error code for display and scripting.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::EmptyText => ErrorCode::EmptyText,
                ValidationKind::MalformedJson => ErrorCode::MalformedJson,
                ValidationKind::NotAnObject => ErrorCode::NotAnObject,
                ValidationKind::InvalidEmail => ErrorCode::InvalidEmail,
                ValidationKind::UnsupportedKind => ErrorCode::UnsupportedKind,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::Refused(kind, _) => match kind {
                RefusalKind::ArchivedDeleteProtected => ErrorCode::ArchivedDeleteProtected,
                RefusalKind::NotSignedIn => ErrorCode::NotSignedIn,
                RefusalKind::Banned => ErrorCode::Banned,
                RefusalKind::NotAuthor => ErrorCode::NotAuthor,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                ConflictKind::Other(_) => ErrorCode::Conflict,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Game => ErrorCode::GameNotFound,
                NotFoundKind::TestReport => ErrorCode::TestReportNotFound,
                NotFoundKind::Comment => ErrorCode::CommentNotFound,
                NotFoundKind::ConfigRecord => ErrorCode::ConfigNotFound,
                NotFoundKind::Other(_) => ErrorCode::NotFound,
            },
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::Timeout => ErrorCode::StoreTimeout,
                InfraErrorKind::StoreUnavailable => ErrorCode::StoreUnavailable,
                InfraErrorKind::DataCorruption => ErrorCode::DataCorruption,
                InfraErrorKind::Other(_) => ErrorCode::StoreError,
            },
        }
    }

    /// Human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Refused(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Infra(_, d) => d,
        }
    }
}
