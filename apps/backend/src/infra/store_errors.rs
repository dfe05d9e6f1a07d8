//! StoreError -> DomainError translation.
//!
//! Services call [`map_store_err`] at every store call site; the returned
//! `DomainError` carries a sanitized detail and the raw error is logged.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::store::{Collection, StoreError};

fn not_found_kind(collection: Collection) -> NotFoundKind {
    match collection {
        Collection::Games => NotFoundKind::Game,
        Collection::Tests => NotFoundKind::TestReport,
        Collection::TestComments | Collection::GameComments => NotFoundKind::Comment,
        Collection::AppConfig => NotFoundKind::ConfigRecord,
    }
}

/// Translate a `StoreError` into a `DomainError` with PII-safe detail.
pub fn map_store_err(e: StoreError) -> DomainError {
    match e {
        StoreError::NotFound { collection, id } => {
            warn!(collection = %collection, id = %id, "Document not found");
            DomainError::not_found(
                not_found_kind(collection),
                format!("{collection}/{id} not found"),
            )
        }
        StoreError::VersionMismatch {
            collection,
            id,
            expected,
            actual,
        } => {
            warn!(
                collection = %collection,
                id = %id,
                expected = ?expected,
                actual = ?actual,
                "Optimistic lock conflict detected"
            );
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!("{collection}/{id} was modified concurrently; refresh and retry"),
            )
        }
        StoreError::Unavailable(msg) => {
            warn!(raw_error = %Redacted(&msg), "Document store unavailable");
            DomainError::infra(InfraErrorKind::StoreUnavailable, "Document store unavailable")
        }
        StoreError::Timeout => {
            warn!("Document store call timed out");
            DomainError::infra(InfraErrorKind::Timeout, "Document store timeout")
        }
        StoreError::Corrupt(msg) => {
            error!(raw_error = %Redacted(&msg), "Corrupt document");
            DomainError::infra(InfraErrorKind::DataCorruption, "Stored document is corrupt")
        }
        StoreError::Backend(msg) => {
            error!(raw_error = %Redacted(&msg), "Unhandled document store error");
            DomainError::infra(
                InfraErrorKind::Other("Store".into()),
                "Document store operation failed",
            )
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        map_store_err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn not_found_maps_per_collection() {
        let err = map_store_err(StoreError::NotFound {
            collection: Collection::TestComments,
            id: "c1".into(),
        });
        assert_eq!(err.code(), ErrorCode::CommentNotFound);
        assert_eq!(err.detail(), "test_comments/c1 not found");

        let err = map_store_err(StoreError::NotFound {
            collection: Collection::Tests,
            id: "t1".into(),
        });
        assert_eq!(err.code(), ErrorCode::TestReportNotFound);
    }

    #[test]
    fn version_mismatch_is_optimistic_lock() {
        let err = map_store_err(StoreError::VersionMismatch {
            collection: Collection::AppConfig,
            id: "bans".into(),
            expected: Some(1),
            actual: Some(2),
        });
        assert_eq!(err.code(), ErrorCode::OptimisticLock);
    }

    #[test]
    fn transport_failures_are_infra_and_hide_raw_text() {
        let err = map_store_err(StoreError::Unavailable(
            "connect to postgres://u:secret@db failed".into(),
        ));
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert!(!err.detail().contains("secret"));

        assert_eq!(map_store_err(StoreError::Timeout).code(), ErrorCode::StoreTimeout);
        assert_eq!(
            map_store_err(StoreError::Corrupt("bad".into())).code(),
            ErrorCode::DataCorruption
        );
        assert_eq!(
            map_store_err(StoreError::Backend("boom".into())).code(),
            ErrorCode::StoreError
        );
    }
}
