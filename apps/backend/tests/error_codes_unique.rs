use std::collections::HashSet;

use compat_backend::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, RefusalKind, ValidationKind,
};
use compat_backend::{AppError, ErrorCode};

#[test]
fn error_codes_are_unique() {
    let all = [
        // Keep in sync with ErrorCode enum variants
        ErrorCode::NotSignedIn,
        ErrorCode::Banned,
        ErrorCode::NotAuthor,
        ErrorCode::EmptyText,
        ErrorCode::MalformedJson,
        ErrorCode::NotAnObject,
        ErrorCode::InvalidEmail,
        ErrorCode::UnsupportedKind,
        ErrorCode::ValidationError,
        ErrorCode::ArchivedDeleteProtected,
        ErrorCode::GameNotFound,
        ErrorCode::TestReportNotFound,
        ErrorCode::CommentNotFound,
        ErrorCode::ConfigNotFound,
        ErrorCode::NotFound,
        ErrorCode::OptimisticLock,
        ErrorCode::Conflict,
        ErrorCode::StoreUnavailable,
        ErrorCode::StoreTimeout,
        ErrorCode::DataCorruption,
        ErrorCode::StoreError,
        ErrorCode::ConfigError,
        ErrorCode::Internal,
    ];

    let mut seen = HashSet::new();
    for code in all {
        let s = code.as_str();
        assert!(seen.insert(s), "Duplicate error code string: {s}");
        assert_eq!(s, s.to_ascii_uppercase());
    }
}

#[test]
fn exit_codes_group_by_cause() {
    let cases = [
        (DomainError::validation(ValidationKind::EmptyText, "x"), 2),
        (DomainError::refused(RefusalKind::ArchivedDeleteProtected, "x"), 2),
        (DomainError::not_found(NotFoundKind::Comment, "x"), 3),
        (DomainError::conflict(ConflictKind::OptimisticLock, "x"), 3),
        (DomainError::infra(InfraErrorKind::Timeout, "x"), 1),
    ];
    for (domain, expected) in cases {
        let code = domain.code();
        let app = AppError::from(domain);
        assert_eq!(app.code(), code);
        assert_eq!(app.exit_code(), expected, "{code}");
    }
    assert_eq!(AppError::config("bad").exit_code(), 2);
    assert_eq!(AppError::config("bad").code(), ErrorCode::ConfigError);
}
