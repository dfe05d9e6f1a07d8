//! Configuration records: the admin allow-list and the ban list.
//!
//! Both records are `{ "emails": [...], "updatedAtMillis": n }` documents in
//! the app config collection. Writes go through compare-and-swap on the
//! document version.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::codec::Versioned;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::store::{Collection, Document, DocumentStore, Fields};
use crate::utils::clock::now_millis;

const COLLECTION: Collection = Collection::AppConfig;

pub const ADMINS_DOC: &str = "admins";
pub const BANS_DOC: &str = "bans";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailList {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub updated_at_millis: i64,
}

fn decode_list(doc: Document) -> Result<Versioned<EmailList>, DomainError> {
    let version = doc.version;
    let id = doc.id;
    let value = serde_json::from_value(Value::Object(doc.fields)).map_err(|_| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("config record '{id}' has an unexpected shape"),
        )
    })?;
    Ok(Versioned { value, version })
}

/// Read an email list record; `None` when it was never written.
pub async fn load_email_list(
    store: &dyn DocumentStore,
    doc_id: &str,
) -> Result<Option<Versioned<EmailList>>, DomainError> {
    store
        .get(COLLECTION, doc_id)
        .await?
        .map(decode_list)
        .transpose()
}

/// Write `emails` if the record is still at `expected_version`
/// (`None`: only if the record does not exist yet).
pub async fn swap_email_list(
    store: &dyn DocumentStore,
    doc_id: &str,
    expected_version: Option<i64>,
    emails: Vec<String>,
) -> Result<Versioned<EmailList>, DomainError> {
    let mut fields = Fields::new();
    fields.insert("emails".into(), Value::from(emails));
    fields.insert("updatedAtMillis".into(), Value::from(now_millis()));

    let doc = store
        .compare_and_swap(COLLECTION, doc_id, expected_version, fields)
        .await?;
    decode_list(doc)
}
