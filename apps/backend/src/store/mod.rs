//! Document store contract.
//!
//! The remote document database is an external collaborator; everything the
//! services need from it goes through [`DocumentStore`]. Two implementations
//! live in this crate: [`memory::MemoryStore`] and
//! `adapters::documents_sea::SeaDocumentStore`.
//!
//! Every collection has a numeric ordering field (a server timestamp in
//! milliseconds) and optionally a parent field. Stores order page queries by
//! the ordering field descending, then by document id descending.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;

/// Document body: a JSON object without the id.
pub type Fields = Map<String, Value>;

/// Collections the backend reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Games,
    Tests,
    TestComments,
    GameComments,
    AppConfig,
}

impl Collection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Games => "games",
            Collection::Tests => "tests",
            Collection::TestComments => "test_comments",
            Collection::GameComments => "game_comments",
            Collection::AppConfig => "app_config",
        }
    }

    /// Field holding the server timestamp used for page ordering.
    pub const fn order_field(&self) -> &'static str {
        match self {
            Collection::Tests => "updatedAtMillis",
            Collection::Games | Collection::TestComments | Collection::GameComments => {
                "createdAtMillis"
            }
            Collection::AppConfig => "updatedAtMillis",
        }
    }

    /// Field referencing the owning document, if the collection has one.
    pub const fn parent_field(&self) -> Option<&'static str> {
        match self {
            Collection::Tests => Some("gameId"),
            Collection::TestComments | Collection::GameComments => Some("parentId"),
            Collection::Games | Collection::AppConfig => None,
        }
    }

    /// Ordering key of a document body; missing or non-integer values sort as 0.
    pub fn order_key_of(&self, fields: &Fields) -> i64 {
        fields
            .get(self.order_field())
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn parent_of<'a>(&self, fields: &'a Fields) -> Option<&'a str> {
        self.parent_field()
            .and_then(|f| fields.get(f))
            .and_then(Value::as_str)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    /// Incremented by the store on every write.
    pub version: i64,
}

impl Document {
    pub fn page_cursor(&self, collection: Collection) -> PageCursor {
        PageCursor {
            order_key: collection.order_key_of(&self.fields),
            doc_id: self.id.clone(),
        }
    }
}

/// Position of the last item of a page; the next page starts strictly after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub order_key: i64,
    pub doc_id: String,
}

impl PageCursor {
    /// Whether a document at (`order_key`, `doc_id`) sorts strictly after this
    /// cursor in descending page order.
    pub fn precedes(&self, order_key: i64, doc_id: &str) -> bool {
        order_key < self.order_key || (order_key == self.order_key && doc_id < self.doc_id.as_str())
    }
}

/// Ordered range query: newest first, limited, optionally after a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub collection: Collection,
    pub limit: usize,
    pub start_after: Option<PageCursor>,
    pub parent_id: Option<String>,
}

impl PageQuery {
    pub fn new(collection: Collection, limit: usize) -> Self {
        Self {
            collection,
            limit,
            start_after: None,
            parent_id: None,
        }
    }

    pub fn after(mut self, cursor: PageCursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    pub fn for_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Failures reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out")]
    Timeout,
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: String },
    #[error("{collection}/{id} version mismatch: expected {expected:?}, actual {actual:?}")]
    VersionMismatch {
        collection: Collection,
        id: String,
        expected: Option<i64>,
        actual: Option<i64>,
    },
    #[error("corrupt document: {0}")]
    Corrupt(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Remote document store contract.
///
/// All calls are suspension points; implementations must be safe to call
/// concurrently. Single-document writes are atomic; there are no
/// cross-document transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ordered range query (see module docs for ordering).
    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Document>, StoreError>;

    /// Point read.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create a document with a store-generated id.
    async fn insert(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError>;

    /// Create or fully replace the document at `id`.
    async fn put(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Fully replace an existing document. When `stamp_field` is given the
    /// store writes its own current time (epoch millis) into that field.
    async fn overwrite(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError>;

    /// Atomically merge `patch` into an existing document. `null` values
    /// remove the field. `stamp_field` as for [`DocumentStore::overwrite`].
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        patch: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError>;

    /// Replace the document only if its version still equals
    /// `expected_version` (`None`: only if it does not exist yet).
    async fn compare_and_swap(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
        fields: Fields,
    ) -> Result<Document, StoreError>;

    /// Delete a document. With `expected_version` the delete only happens if
    /// the stored version still matches. Deleting a missing document is a
    /// no-op when no version is expected.
    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
    ) -> Result<(), StoreError>;
}
