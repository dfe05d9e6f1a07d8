//! Comment repository functions, shared by both comment collections.

use serde_json::Value;

use super::codec::{decode, encode};
use crate::domain::Comment;
use crate::errors::domain::DomainError;
use crate::store::{Collection, DocumentStore, Fields};

pub async fn find_comment(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<Comment>, DomainError> {
    store
        .get(collection, id)
        .await?
        .map(|doc| decode(collection, doc))
        .transpose()
}

pub async fn create_comment(
    store: &dyn DocumentStore,
    collection: Collection,
    comment: &Comment,
) -> Result<Comment, DomainError> {
    let doc = store.insert(collection, encode(comment)?).await?;
    decode(collection, doc)
}

/// Replace the text and stamp `editedAtMillis`.
pub async fn set_text(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    text: &str,
) -> Result<Comment, DomainError> {
    let mut patch = Fields::new();
    patch.insert("text".into(), Value::from(text));
    let doc = store
        .update_fields(collection, id, patch, Some("editedAtMillis"))
        .await?;
    decode(collection, doc)
}

pub async fn delete_comment(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<(), DomainError> {
    store.delete(collection, id, None).await?;
    Ok(())
}
