//! User-facing writes: new reports, report edits and comments.

use tracing::info;

use crate::domain::{Comment, ReportDraft, TestReport};
use crate::errors::domain::{DomainError, NotFoundKind, RefusalKind, ValidationKind};
use crate::repos::{comments, reports};
use crate::services::moderation::ContentKind;
use crate::state::Session;
use crate::store::DocumentStore;
use crate::utils::clock::now_millis;

/// Signed-in, non-banned email of the session.
fn require_writer(session: &Session) -> Result<&str, DomainError> {
    let email = session.email().ok_or_else(|| {
        DomainError::refused(RefusalKind::NotSignedIn, "sign in to contribute")
    })?;
    if session.is_self_banned() {
        return Err(DomainError::refused(
            RefusalKind::Banned,
            "this account may not contribute",
        ));
    }
    Ok(email)
}

fn require_id(value: &str, what: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Other(what.into()),
            format!("{what} is required"),
        ));
    }
    Ok(())
}

pub async fn submit_report(
    store: &dyn DocumentStore,
    session: &Session,
    game_id: &str,
    draft: ReportDraft,
) -> Result<TestReport, DomainError> {
    let author = require_writer(session)?;
    require_id(game_id, "gameId")?;

    let now = now_millis();
    let mut report = TestReport::new(String::new(), game_id.trim(), draft.status, now);
    report.author_email = Some(author.to_string());
    report.apply_draft(draft);

    let created = reports::create_report(store, &report).await?;
    info!(id = %created.id, game_id = %created.game_id, status = %created.status, "report submitted");
    Ok(created)
}

/// Replace the editable fields of a report. Only its author or an admin may.
pub async fn update_report(
    store: &dyn DocumentStore,
    session: &Session,
    report: &TestReport,
    draft: ReportDraft,
) -> Result<TestReport, DomainError> {
    let email = require_writer(session)?;
    let id = &report.id;
    let stored = reports::find_report(store, id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::TestReport, format!("test {id} not found"))
    })?;
    // Authorship is judged on the stored record, never on the caller's copy.
    let is_author = stored.value.author_email.as_deref() == Some(email);
    if !is_author && !session.is_admin() {
        return Err(DomainError::refused(
            RefusalKind::NotAuthor,
            "only the author or an admin may edit this report",
        ));
    }

    let updated = reports::apply_draft(store, &report.id, &draft).await?;
    info!(id = %updated.id, status = %updated.status, by_admin = !is_author, "report updated");
    Ok(updated)
}

pub async fn post_comment(
    store: &dyn DocumentStore,
    session: &Session,
    kind: ContentKind,
    parent_id: &str,
    text: &str,
    author_name: Option<&str>,
) -> Result<Comment, DomainError> {
    let author = require_writer(session)?;
    if !kind.is_comment() {
        return Err(DomainError::validation(
            ValidationKind::UnsupportedKind,
            format!("{kind} does not hold comments"),
        ));
    }
    require_id(parent_id, "parentId")?;
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::EmptyText,
            "comment text is empty",
        ));
    }

    let mut comment = Comment::new(String::new(), parent_id.trim(), text, now_millis());
    comment.author_email = Some(author.to_string());
    comment.author_name = author_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let created = comments::create_comment(store, kind.collection(), &comment).await?;
    info!(kind = %kind, id = %created.id, parent_id = %created.parent_id, "comment posted");
    Ok(created)
}
