//! Conversion between stored documents and domain values.
//!
//! Domain types keep their id out of the serialized body (`#[serde(skip)]`);
//! decoding fills it back in from the document id.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Comment, GameInfo, TestReport};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::store::{Collection, Document, Fields};

/// A domain value stored as one document.
pub trait StoredDoc: Serialize + DeserializeOwned {
    fn doc_id(&self) -> &str;
    fn set_doc_id(&mut self, id: String);
}

impl StoredDoc for TestReport {
    fn doc_id(&self) -> &str {
        &self.id
    }
    fn set_doc_id(&mut self, id: String) {
        self.id = id;
    }
}

impl StoredDoc for Comment {
    fn doc_id(&self) -> &str {
        &self.id
    }
    fn set_doc_id(&mut self, id: String) {
        self.id = id;
    }
}

impl StoredDoc for GameInfo {
    fn doc_id(&self) -> &str {
        &self.id
    }
    fn set_doc_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A decoded value together with the store version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

pub fn decode<T: StoredDoc>(collection: Collection, doc: Document) -> Result<T, DomainError> {
    let Document { id, fields, .. } = doc;
    let mut value: T = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        warn!(collection = %collection, id = %id, error = %e, "Document does not decode");
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("{collection}/{id} has an unexpected shape"),
        )
    })?;
    value.set_doc_id(id);
    Ok(value)
}

pub fn decode_versioned<T: StoredDoc>(
    collection: Collection,
    doc: Document,
) -> Result<Versioned<T>, DomainError> {
    let version = doc.version;
    Ok(Versioned {
        value: decode(collection, doc)?,
        version,
    })
}

pub fn decode_all<T: StoredDoc>(
    collection: Collection,
    docs: Vec<Document>,
) -> Result<Vec<T>, DomainError> {
    docs.into_iter().map(|doc| decode(collection, doc)).collect()
}

/// Serialize a value into a document body.
pub fn encode<T: Serialize>(value: &T) -> Result<Fields, DomainError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(DomainError::infra(
            InfraErrorKind::Other("Encode".into()),
            "value does not serialize to an object",
        )),
        Err(e) => Err(DomainError::infra(
            InfraErrorKind::Other("Encode".into()),
            format!("value does not serialize: {e}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::WorkStatus;

    #[test]
    fn decode_fills_id_and_defaults() {
        let doc = Document {
            id: "t1".into(),
            fields: json!({"gameId": "g1", "status": "WORKING", "updatedAtMillis": 5})
                .as_object()
                .cloned()
                .unwrap(),
            version: 3,
        };
        let report: TestReport = decode(Collection::Tests, doc).unwrap();
        assert_eq!(report.id, "t1");
        assert_eq!(report.status, WorkStatus::Working);
        assert!(!report.archived);
        assert_eq!(report.device, None);
    }

    #[test]
    fn decode_wrong_shape_is_data_corruption() {
        let doc = Document {
            id: "t1".into(),
            fields: json!({"status": 42}).as_object().cloned().unwrap(),
            version: 1,
        };
        let err = decode::<TestReport>(Collection::Tests, doc).unwrap_err();
        assert!(matches!(err, DomainError::Infra(InfraErrorKind::DataCorruption, _)));
    }

    #[test]
    fn encode_leaves_id_out() {
        let fields = encode(&Comment::new("c1", "t1", "works fine", 9)).unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["parentId"], json!("t1"));
        assert_eq!(fields["text"], json!("works fine"));
    }
}
