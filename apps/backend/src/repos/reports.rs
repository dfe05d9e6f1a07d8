//! Test report repository functions.

use serde_json::{json, Value};

use super::codec::{decode, decode_all, decode_versioned, encode, Versioned};
use crate::domain::{ReportDraft, TestReport};
use crate::errors::domain::DomainError;
use crate::store::{Collection, DocumentStore, Fields, PageQuery};

const COLLECTION: Collection = Collection::Tests;

fn patch(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

pub async fn find_report(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<Versioned<TestReport>>, DomainError> {
    store
        .get(COLLECTION, id)
        .await?
        .map(|doc| decode_versioned(COLLECTION, doc))
        .transpose()
}

/// Store a new report; the returned value carries the generated id.
pub async fn create_report(
    store: &dyn DocumentStore,
    report: &TestReport,
) -> Result<TestReport, DomainError> {
    let doc = store.insert(COLLECTION, encode(report)?).await?;
    decode(COLLECTION, doc)
}

/// Every report of one game, read page by page until exhausted.
pub async fn reports_for_game(
    store: &dyn DocumentStore,
    game_id: &str,
    page_size: usize,
) -> Result<Vec<TestReport>, DomainError> {
    let page_size = page_size.max(1);
    let mut query = PageQuery::new(COLLECTION, page_size).for_parent(game_id);
    let mut reports = Vec::new();
    loop {
        let docs = store.query_page(&query).await?;
        let full = docs.len() == page_size;
        let next = docs.last().map(|doc| doc.page_cursor(COLLECTION));
        reports.extend(decode_all::<TestReport>(COLLECTION, docs)?);
        match next {
            Some(cursor) if full => query = query.after(cursor),
            _ => break,
        }
    }
    Ok(reports)
}

/// Set the archived flag. Archiving stamps `archivedAtMillis` server-side;
/// unarchiving removes it.
pub async fn set_archived(
    store: &dyn DocumentStore,
    id: &str,
    archived: bool,
) -> Result<TestReport, DomainError> {
    let doc = if archived {
        store
            .update_fields(
                COLLECTION,
                id,
                patch(json!({ "archived": true })),
                Some("archivedAtMillis"),
            )
            .await?
    } else {
        store
            .update_fields(
                COLLECTION,
                id,
                patch(json!({ "archived": false, "archivedAtMillis": null })),
                None,
            )
            .await?
    };
    decode(COLLECTION, doc)
}

/// Replace the user-editable fields and bump `updatedAtMillis`.
/// Cleared optional fields are removed from the document.
pub async fn apply_draft(
    store: &dyn DocumentStore,
    id: &str,
    draft: &ReportDraft,
) -> Result<TestReport, DomainError> {
    let doc = store
        .update_fields(COLLECTION, id, encode(draft)?, Some("updatedAtMillis"))
        .await?;
    decode(COLLECTION, doc)
}

/// Delete only if the stored report is still at `expected_version`.
pub async fn delete_report(
    store: &dyn DocumentStore,
    id: &str,
    expected_version: i64,
) -> Result<(), DomainError> {
    store.delete(COLLECTION, id, Some(expected_version)).await?;
    Ok(())
}
