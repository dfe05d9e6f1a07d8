//! Kind-agnostic document operations used by moderation.

use crate::errors::domain::DomainError;
use crate::store::{Collection, Document, DocumentStore, Fields};

/// Stamped by the store on every raw overwrite.
pub const EDITED_AT_FIELD: &str = "editedAtMillis";

/// Replace every field of the document; the store stamps `editedAtMillis`.
pub async fn overwrite_raw(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    fields: Fields,
) -> Result<Document, DomainError> {
    Ok(store
        .overwrite(collection, id, fields, Some(EDITED_AT_FIELD))
        .await?)
}
