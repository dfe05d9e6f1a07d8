//! Error codes for the compatibility tracker backend.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and are what the CLI prints next to
//! an error message.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Session & authorization
    /// Operation needs a signed-in user
    NotSignedIn,
    /// Signed-in user is on the ban list
    Banned,
    /// Only the author or an admin may change this record
    NotAuthor,

    // Request validation
    /// Comment or text field is empty after trimming
    EmptyText,
    /// Raw document edit is not valid JSON
    MalformedJson,
    /// Raw document edit is valid JSON but not an object
    NotAnObject,
    /// Invalid email address
    InvalidEmail,
    /// Operation does not apply to this content kind
    UnsupportedKind,
    /// General validation error
    ValidationError,

    // Invariant-protected refusals
    /// Archived test reports cannot be deleted
    ArchivedDeleteProtected,

    // Resource not found
    GameNotFound,
    TestReportNotFound,
    CommentNotFound,
    ConfigNotFound,
    NotFound,

    // Conflicts
    /// Concurrent modification detected by a versioned write
    OptimisticLock,
    Conflict,

    // System errors
    StoreUnavailable,
    StoreTimeout,
    DataCorruption,
    StoreError,
    ConfigError,
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::Banned => "BANNED",
            Self::NotAuthor => "NOT_AUTHOR",

            Self::EmptyText => "EMPTY_TEXT",
            Self::MalformedJson => "MALFORMED_JSON",
            Self::NotAnObject => "NOT_AN_OBJECT",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::UnsupportedKind => "UNSUPPORTED_KIND",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::ArchivedDeleteProtected => "ARCHIVED_DELETE_PROTECTED",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::TestReportNotFound => "TEST_REPORT_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::StoreError => "STORE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
