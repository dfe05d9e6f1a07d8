//! Admin moderation of test reports and comments.
//!
//! Every operation first checks the session's cached access level. Sessions
//! without admin access get [`Moderated::NoAccess`] and no store call is
//! made. Input validation also happens before any store call.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{Comment, TestReport};
use crate::errors::domain::{DomainError, NotFoundKind, RefusalKind, ValidationKind};
use crate::repos::{comments, documents, reports};
use crate::state::{Access, Session};
use crate::store::{Collection, Document, DocumentStore, Fields};

/// Collections the moderation panel works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Tests,
    TestComments,
    GameComments,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [
        ContentKind::Tests,
        ContentKind::TestComments,
        ContentKind::GameComments,
    ];

    pub const fn collection(&self) -> Collection {
        match self {
            ContentKind::Tests => Collection::Tests,
            ContentKind::TestComments => Collection::TestComments,
            ContentKind::GameComments => Collection::GameComments,
        }
    }

    pub const fn is_comment(&self) -> bool {
        matches!(self, ContentKind::TestComments | ContentKind::GameComments)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Tests => "tests",
            ContentKind::TestComments => "test-comments",
            ContentKind::GameComments => "game-comments",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "tests" | "test" => Ok(ContentKind::Tests),
            "test-comments" => Ok(ContentKind::TestComments),
            "game-comments" => Ok(ContentKind::GameComments),
            other => Err(DomainError::validation(
                ValidationKind::UnsupportedKind,
                format!("unknown content kind '{other}'"),
            )),
        }
    }
}

/// Result of an admin-gated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Moderated<T> {
    Done(T),
    /// The session lacks admin access; nothing happened.
    NoAccess(Access),
}

impl<T> Moderated<T> {
    pub fn done(self) -> Option<T> {
        match self {
            Moderated::Done(value) => Some(value),
            Moderated::NoAccess(_) => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Moderated::Done(_))
    }
}

/// An item shown in the moderation panel.
pub trait Moderatable {
    fn doc_id(&self) -> &str;

    fn is_archived(&self) -> bool {
        false
    }
}

impl Moderatable for TestReport {
    fn doc_id(&self) -> &str {
        &self.id
    }

    fn is_archived(&self) -> bool {
        self.archived
    }
}

impl Moderatable for Comment {
    fn doc_id(&self) -> &str {
        &self.id
    }
}

/// `Some(access)` when the session may not moderate.
fn denied(session: &Session, operation: &'static str) -> Option<Access> {
    if session.is_admin() {
        return None;
    }
    info!(operation, access = ?session.access(), "moderation skipped without admin access");
    Some(session.access())
}

fn archived_refusal(id: &str) -> DomainError {
    DomainError::refused(
        RefusalKind::ArchivedDeleteProtected,
        format!("test {id} is archived; unarchive it before deleting"),
    )
}

pub async fn archive_test(
    store: &dyn DocumentStore,
    session: &Session,
    report: &TestReport,
) -> Result<Moderated<TestReport>, DomainError> {
    if let Some(access) = denied(session, "archive") {
        return Ok(Moderated::NoAccess(access));
    }
    let updated = reports::set_archived(store, &report.id, true).await?;
    info!(id = %report.id, "test archived");
    Ok(Moderated::Done(updated))
}

pub async fn unarchive_test(
    store: &dyn DocumentStore,
    session: &Session,
    report: &TestReport,
) -> Result<Moderated<TestReport>, DomainError> {
    if let Some(access) = denied(session, "unarchive") {
        return Ok(Moderated::NoAccess(access));
    }
    let updated = reports::set_archived(store, &report.id, false).await?;
    info!(id = %report.id, "test unarchived");
    Ok(Moderated::Done(updated))
}

/// Delete an item. Archived tests are refused: as shown (no store call) and
/// as stored (the delete is guarded by the version that was checked).
pub async fn delete(
    store: &dyn DocumentStore,
    session: &Session,
    kind: ContentKind,
    item: &(impl Moderatable + ?Sized),
) -> Result<Moderated<()>, DomainError> {
    if let Some(access) = denied(session, "delete") {
        return Ok(Moderated::NoAccess(access));
    }
    let id = item.doc_id();

    match kind {
        ContentKind::Tests => {
            if item.is_archived() {
                warn!(id, "refusing to delete archived test");
                return Err(archived_refusal(id));
            }
            let stored = reports::find_report(store, id).await?.ok_or_else(|| {
                DomainError::not_found(NotFoundKind::TestReport, format!("test {id} not found"))
            })?;
            if stored.value.archived {
                warn!(id, "refusing to delete test archived since it was loaded");
                return Err(archived_refusal(id));
            }
            reports::delete_report(store, id, stored.version).await?;
        }
        ContentKind::TestComments | ContentKind::GameComments => {
            comments::delete_comment(store, kind.collection(), id).await?;
        }
    }

    info!(kind = %kind, id, "item deleted");
    Ok(Moderated::Done(()))
}

/// Parse a raw JSON document body; it must be an object.
pub fn parse_raw_document(raw: &str) -> Result<Fields, DomainError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(DomainError::validation(
            ValidationKind::NotAnObject,
            "document must be a JSON object",
        )),
        Err(e) => Err(DomainError::validation(
            ValidationKind::MalformedJson,
            format!("malformed JSON: {e}"),
        )),
    }
}

/// Replace the whole stored document with `raw` (not a merge). Fields left
/// out of `raw` are gone afterwards. The store stamps `editedAtMillis`.
pub async fn edit_raw(
    store: &dyn DocumentStore,
    session: &Session,
    kind: ContentKind,
    item: &(impl Moderatable + ?Sized),
    raw: &str,
) -> Result<Moderated<Document>, DomainError> {
    if let Some(access) = denied(session, "edit_raw") {
        return Ok(Moderated::NoAccess(access));
    }
    let fields = parse_raw_document(raw)?;
    let doc = documents::overwrite_raw(store, kind.collection(), item.doc_id(), fields).await?;
    info!(kind = %kind, id = %doc.id, "document overwritten");
    Ok(Moderated::Done(doc))
}

/// Replace a comment's text; the trimmed text must not be empty.
pub async fn edit_text(
    store: &dyn DocumentStore,
    session: &Session,
    kind: ContentKind,
    item: &(impl Moderatable + ?Sized),
    text: &str,
) -> Result<Moderated<Comment>, DomainError> {
    if let Some(access) = denied(session, "edit_text") {
        return Ok(Moderated::NoAccess(access));
    }
    if !kind.is_comment() {
        return Err(DomainError::validation(
            ValidationKind::UnsupportedKind,
            format!("text edits apply to comments, not {kind}"),
        ));
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::EmptyText,
            "comment text is empty",
        ));
    }
    let updated = comments::set_text(store, kind.collection(), item.doc_id(), text).await?;
    info!(kind = %kind, id = %updated.id, "comment text edited");
    Ok(Moderated::Done(updated))
}
