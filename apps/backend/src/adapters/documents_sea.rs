//! SeaORM adapter for the document store - generic over ConnectionTrait.
//!
//! Every document is one row of the `documents` table. The JSON body is kept
//! as text; the ordering key and parent id are copied out of the body on each
//! write so page scans can use the indexes.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::entities::documents;
use crate::logging::pii::Redacted;
use crate::store::{Collection, Document, DocumentStore, Fields, PageQuery, StoreError};
use crate::utils::clock::now_millis;
use crate::utils::ids::new_document_id;

/// Attempts for read-merge-write field updates before giving up.
const MERGE_ATTEMPTS: usize = 5;

// Adapter functions return DbErr; the store impl below maps to StoreError.

fn decode_row(row: documents::Model) -> Result<Document, StoreError> {
    let body: Value = serde_json::from_str(&row.body).map_err(|e| {
        StoreError::Corrupt(format!("{}/{}: {e}", row.collection, row.id))
    })?;
    match body {
        Value::Object(fields) => Ok(Document {
            id: row.id,
            fields,
            version: row.version,
        }),
        _ => Err(StoreError::Corrupt(format!(
            "{}/{}: body is not an object",
            row.collection, row.id
        ))),
    }
}

fn encode_body(fields: &Fields) -> Result<String, StoreError> {
    serde_json::to_string(fields).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn stamp(fields: &mut Fields, stamp_field: Option<&str>) {
    if let Some(field) = stamp_field {
        fields.insert(field.to_string(), Value::from(now_millis()));
    }
}

pub async fn find_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    collection: Collection,
    id: &str,
) -> Result<Option<documents::Model>, DbErr> {
    documents::Entity::find_by_id((collection.as_str().to_string(), id.to_string()))
        .one(conn)
        .await
}

pub async fn find_page<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: &PageQuery,
) -> Result<Vec<documents::Model>, DbErr> {
    let mut select = documents::Entity::find()
        .filter(documents::Column::Collection.eq(query.collection.as_str()));

    if let Some(parent) = &query.parent_id {
        select = select.filter(documents::Column::ParentId.eq(parent.as_str()));
    }

    if let Some(cursor) = &query.start_after {
        select = select.filter(
            Condition::any()
                .add(documents::Column::OrderKey.lt(cursor.order_key))
                .add(
                    Condition::all()
                        .add(documents::Column::OrderKey.eq(cursor.order_key))
                        .add(documents::Column::Id.lt(cursor.doc_id.as_str())),
                ),
        );
    }

    select
        .order_by_desc(documents::Column::OrderKey)
        .order_by_desc(documents::Column::Id)
        .limit(query.limit as u64)
        .all(conn)
        .await
}

pub async fn insert_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    collection: Collection,
    id: &str,
    body: String,
    fields: &Fields,
) -> Result<(), DbErr> {
    let row = documents::ActiveModel {
        collection: Set(collection.as_str().to_string()),
        id: Set(id.to_string()),
        parent_id: Set(collection.parent_of(fields).map(str::to_string)),
        order_key: Set(collection.order_key_of(fields)),
        body: Set(body),
        version: Set(1),
    };
    documents::Entity::insert(row).exec_without_returning(conn).await?;
    Ok(())
}

/// Replace the body of a row, bumping its version. With `expected_version`
/// the update only applies if the stored version still matches.
///
/// Returns the number of rows affected (0 or 1).
pub async fn replace_body<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    collection: Collection,
    id: &str,
    expected_version: Option<i64>,
    body: String,
    fields: &Fields,
) -> Result<u64, DbErr> {
    let mut update = documents::Entity::update_many()
        .col_expr(documents::Column::Body, Expr::value(body))
        .col_expr(
            documents::Column::ParentId,
            Expr::value(collection.parent_of(fields).map(str::to_string)),
        )
        .col_expr(
            documents::Column::OrderKey,
            Expr::value(collection.order_key_of(fields)),
        )
        .col_expr(
            documents::Column::Version,
            Expr::col(documents::Column::Version).add(1),
        )
        .filter(documents::Column::Collection.eq(collection.as_str()))
        .filter(documents::Column::Id.eq(id));

    if let Some(version) = expected_version {
        update = update.filter(documents::Column::Version.eq(version));
    }

    Ok(update.exec(conn).await?.rows_affected)
}

pub async fn delete_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    collection: Collection,
    id: &str,
    expected_version: Option<i64>,
) -> Result<u64, DbErr> {
    let mut delete = documents::Entity::delete_many()
        .filter(documents::Column::Collection.eq(collection.as_str()))
        .filter(documents::Column::Id.eq(id));

    if let Some(version) = expected_version {
        delete = delete.filter(documents::Column::Version.eq(version));
    }

    Ok(delete.exec(conn).await?.rows_affected)
}

fn map_db_err(e: DbErr) -> StoreError {
    match &e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(raw_error = %Redacted(&e.to_string()), "Document database unavailable");
            StoreError::Unavailable(e.to_string())
        }
        _ if e.to_string().contains("timeout") => StoreError::Timeout,
        _ => StoreError::Backend(e.to_string()),
    }
}

/// [`DocumentStore`] backed by a SQL database through SeaORM.
#[derive(Debug, Clone)]
pub struct SeaDocumentStore {
    conn: DatabaseConnection,
}

impl SeaDocumentStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn require(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        match find_row(&self.conn, collection, id).await.map_err(map_db_err)? {
            Some(row) => decode_row(row),
            None => Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            }),
        }
    }

    /// Version-guarded replace followed by a refetch.
    ///
    /// Distinguishes a missing document from a version conflict when no row
    /// was affected.
    async fn replace_then_fetch(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let body = encode_body(&fields)?;
        let affected = replace_body(&self.conn, collection, id, expected_version, body, &fields)
            .await
            .map_err(map_db_err)?;

        if affected == 0 {
            let actual = find_row(&self.conn, collection, id)
                .await
                .map_err(map_db_err)?
                .map(|row| row.version);
            return Err(match (actual, expected_version) {
                (Some(actual), expected) => StoreError::VersionMismatch {
                    collection,
                    id: id.to_string(),
                    expected,
                    actual: Some(actual),
                },
                (None, _) => StoreError::NotFound {
                    collection,
                    id: id.to_string(),
                },
            });
        }

        self.require(collection, id).await
    }
}

#[async_trait]
impl DocumentStore for SeaDocumentStore {
    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Document>, StoreError> {
        let rows = find_page(&self.conn, query).await.map_err(map_db_err)?;
        debug!(collection = %query.collection, returned = rows.len(), "sea query_page");
        rows.into_iter().map(decode_row).collect()
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        find_row(&self.conn, collection, id)
            .await
            .map_err(map_db_err)?
            .map(decode_row)
            .transpose()
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError> {
        let id = new_document_id();
        let body = encode_body(&fields)?;
        insert_row(&self.conn, collection, &id, body, &fields)
            .await
            .map_err(map_db_err)?;
        Ok(Document {
            id,
            fields,
            version: 1,
        })
    }

    async fn put(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document, StoreError> {
        let body = encode_body(&fields)?;
        let affected = replace_body(&self.conn, collection, id, None, body.clone(), &fields)
            .await
            .map_err(map_db_err)?;
        if affected == 0 {
            insert_row(&self.conn, collection, id, body, &fields)
                .await
                .map_err(map_db_err)?;
        }
        self.require(collection, id).await
    }

    async fn overwrite(
        &self,
        collection: Collection,
        id: &str,
        mut fields: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError> {
        stamp(&mut fields, stamp_field);
        self.replace_then_fetch(collection, id, None, fields).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        mut patch: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError> {
        stamp(&mut patch, stamp_field);

        let mut last_err = None;
        for attempt in 1..=MERGE_ATTEMPTS {
            let current = self.require(collection, id).await?;
            let mut merged = current.fields;
            for (key, value) in &patch {
                if value.is_null() {
                    merged.remove(key);
                } else {
                    merged.insert(key.clone(), value.clone());
                }
            }

            match self
                .replace_then_fetch(collection, id, Some(current.version), merged)
                .await
            {
                Err(err @ StoreError::VersionMismatch { .. }) => {
                    debug!(collection = %collection, id, attempt, "field update raced, retrying");
                    last_err = Some(err);
                }
                other => return other,
            }
        }

        Err(last_err.unwrap_or(StoreError::Backend("field update failed".into())))
    }

    async fn compare_and_swap(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let Some(expected) = expected_version else {
            let body = encode_body(&fields)?;
            return match insert_row(&self.conn, collection, id, body, &fields).await {
                Ok(()) => Ok(Document {
                    id: id.to_string(),
                    fields,
                    version: 1,
                }),
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    let actual = find_row(&self.conn, collection, id)
                        .await
                        .map_err(map_db_err)?
                        .map(|row| row.version);
                    Err(StoreError::VersionMismatch {
                        collection,
                        id: id.to_string(),
                        expected: None,
                        actual,
                    })
                }
                Err(e) => Err(map_db_err(e)),
            };
        };

        match self
            .replace_then_fetch(collection, id, Some(expected), fields)
            .await
        {
            Err(StoreError::NotFound { collection, id }) => Err(StoreError::VersionMismatch {
                collection,
                id,
                expected: Some(expected),
                actual: None,
            }),
            other => other,
        }
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
    ) -> Result<(), StoreError> {
        let affected = delete_row(&self.conn, collection, id, expected_version)
            .await
            .map_err(map_db_err)?;

        if affected > 0 || expected_version.is_none() {
            return Ok(());
        }

        match find_row(&self.conn, collection, id).await.map_err(map_db_err)? {
            Some(row) => Err(StoreError::VersionMismatch {
                collection,
                id: id.to_string(),
                expected: expected_version,
                actual: Some(row.version),
            }),
            None => Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            }),
        }
    }
}
