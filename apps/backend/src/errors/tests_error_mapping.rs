// Unit tests for error mapping - pure domain logic without store or database dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, RefusalKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_kinds_to_codes() {
    let cases = [
        (ValidationKind::EmptyText, ErrorCode::EmptyText),
        (ValidationKind::MalformedJson, ErrorCode::MalformedJson),
        (ValidationKind::NotAnObject, ErrorCode::NotAnObject),
        (ValidationKind::InvalidEmail, ErrorCode::InvalidEmail),
        (ValidationKind::UnsupportedKind, ErrorCode::UnsupportedKind),
        (ValidationKind::Other("gameId".into()), ErrorCode::ValidationError),
    ];
    for (kind, code) in cases {
        let app: AppError = DomainError::validation(kind, "bad input").into();
        assert_eq!(app.code(), code);
        assert_eq!(app.exit_code(), 2);
    }
}

#[test]
fn maps_refusals() {
    let archived = DomainError::refused(RefusalKind::ArchivedDeleteProtected, "archived");
    assert_eq!(archived.code().as_str(), "ARCHIVED_DELETE_PROTECTED");

    let app: AppError = DomainError::refused(RefusalKind::NotAuthor, "not yours").into();
    assert_eq!(app.code(), ErrorCode::NotAuthor);
    assert_eq!(app.to_string(), "NOT_AUTHOR: not yours");
}

#[test]
fn maps_conflicts() {
    let lock = DomainError::conflict(ConflictKind::OptimisticLock, "stale");
    assert_eq!(lock.code(), ErrorCode::OptimisticLock);

    // Generic conflict fallback
    let other = DomainError::conflict(ConflictKind::Other("x".into()), "x");
    assert_eq!(other.code(), ErrorCode::Conflict);
}

#[test]
fn maps_not_found_per_entity() {
    assert_eq!(
        DomainError::not_found(NotFoundKind::Game, "g").code(),
        ErrorCode::GameNotFound
    );
    assert_eq!(
        DomainError::not_found(NotFoundKind::TestReport, "t").code(),
        ErrorCode::TestReportNotFound
    );
    assert_eq!(
        DomainError::not_found(NotFoundKind::Other("thing".into()), "?").code(),
        ErrorCode::NotFound
    );
}

#[test]
fn maps_infra_errors() {
    let timeout: AppError = DomainError::infra(InfraErrorKind::Timeout, "slow").into();
    assert_eq!(timeout.code(), ErrorCode::StoreTimeout);
    assert_eq!(timeout.exit_code(), 1);

    let corrupt = DomainError::infra(InfraErrorKind::DataCorruption, "bad body");
    assert_eq!(corrupt.code(), ErrorCode::DataCorruption);
    assert_eq!(corrupt.detail(), "bad body");
}
