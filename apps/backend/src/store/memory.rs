//! In-process document store.
//!
//! Used by tests and local runs in place of the remote database. Besides the
//! store contract it exposes call counters, an artificial per-call latency
//! and one-shot failure injection, so callers can observe how many remote
//! calls an operation issued and how it behaves under transport failures.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use super::{Collection, Document, DocumentStore, Fields, PageQuery, StoreError};
use crate::utils::clock::now_millis;
use crate::utils::ids::new_document_id;

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Snapshot of how many calls reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCounts {
    pub queries: usize,
    pub reads: usize,
    pub mutations: usize,
}

#[derive(Default)]
struct Counters {
    queries: AtomicUsize,
    reads: AtomicUsize,
    mutations: AtomicUsize,
}

pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, BTreeMap<String, Document>>>,
    clock: Clock,
    latency: Mutex<Option<Duration>>,
    failures: Mutex<VecDeque<StoreError>>,
    counters: Counters,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("counts", &self.counts())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(now_millis))
    }

    /// Store whose server-side stamps come from `clock`.
    pub fn with_clock(clock: Arc<dyn Fn() -> i64 + Send + Sync>) -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            clock,
            latency: Mutex::new(None),
            failures: Mutex::new(VecDeque::new()),
            counters: Counters::default(),
        }
    }

    /// Delay every subsequent call by `latency` before it touches the data.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Make the next call fail with `error`. Queued failures are consumed in order.
    pub fn fail_next(&self, error: StoreError) {
        self.failures.lock().push_back(error);
    }

    pub fn counts(&self) -> CallCounts {
        CallCounts {
            queries: self.counters.queries.load(Ordering::SeqCst),
            reads: self.counters.reads.load(Ordering::SeqCst),
            mutations: self.counters.mutations.load(Ordering::SeqCst),
        }
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .lock()
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Write a document directly, bypassing counters, latency and failures.
    /// New documents start at version 1; existing ones get their version bumped.
    pub fn seed(&self, collection: Collection, id: &str, fields: Fields) {
        let mut guard = self.collections.lock();
        let docs = guard.entry(collection).or_default();
        let version = docs.get(id).map_or(1, |d| d.version + 1);
        docs.insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                fields,
                version,
            },
        );
    }

    /// Direct read for assertions, bypassing counters.
    pub fn peek(&self, collection: Collection, id: &str) -> Option<Document> {
        self.collections
            .lock()
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    async fn enter(&self, counter: &AtomicUsize) -> Result<(), StoreError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn stamp(&self, fields: &mut Fields, stamp_field: Option<&str>) {
        if let Some(field) = stamp_field {
            fields.insert(field.to_string(), Value::from((self.clock)()));
        }
    }

    fn not_found(collection: Collection, id: &str) -> StoreError {
        StoreError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Document>, StoreError> {
        self.enter(&self.counters.queries).await?;
        let collection = query.collection;

        let guard = self.collections.lock();
        let Some(docs) = guard.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<(i64, &Document)> = docs
            .values()
            .filter(|doc| match &query.parent_id {
                Some(parent) => collection.parent_of(&doc.fields) == Some(parent.as_str()),
                None => true,
            })
            .map(|doc| (collection.order_key_of(&doc.fields), doc))
            .filter(|(key, doc)| match &query.start_after {
                Some(cursor) => cursor.precedes(*key, &doc.id),
                None => true,
            })
            .collect();

        matching.sort_by(|(ka, a), (kb, b)| kb.cmp(ka).then_with(|| b.id.cmp(&a.id)));

        let page: Vec<Document> = matching
            .into_iter()
            .take(query.limit)
            .map(|(_, doc)| doc.clone())
            .collect();
        trace!(collection = %collection, returned = page.len(), "memory query_page");
        Ok(page)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.enter(&self.counters.reads).await?;
        Ok(self.peek(collection, id))
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError> {
        self.enter(&self.counters.mutations).await?;
        let doc = Document {
            id: new_document_id(),
            fields,
            version: 1,
        };
        self.collections
            .lock()
            .entry(collection)
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn put(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document, StoreError> {
        self.enter(&self.counters.mutations).await?;
        let mut guard = self.collections.lock();
        let docs = guard.entry(collection).or_default();
        let version = docs.get(id).map_or(1, |d| d.version + 1);
        let doc = Document {
            id: id.to_string(),
            fields,
            version,
        };
        docs.insert(id.to_string(), doc.clone());
        Ok(doc)
    }

    async fn overwrite(
        &self,
        collection: Collection,
        id: &str,
        mut fields: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError> {
        self.enter(&self.counters.mutations).await?;
        self.stamp(&mut fields, stamp_field);
        let mut guard = self.collections.lock();
        let doc = guard
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Self::not_found(collection, id))?;
        doc.fields = fields;
        doc.version += 1;
        Ok(doc.clone())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        mut patch: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError> {
        self.enter(&self.counters.mutations).await?;
        self.stamp(&mut patch, stamp_field);
        let mut guard = self.collections.lock();
        let doc = guard
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Self::not_found(collection, id))?;
        for (key, value) in patch {
            if value.is_null() {
                doc.fields.remove(&key);
            } else {
                doc.fields.insert(key, value);
            }
        }
        doc.version += 1;
        Ok(doc.clone())
    }

    async fn compare_and_swap(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        self.enter(&self.counters.mutations).await?;
        let mut guard = self.collections.lock();
        let docs = guard.entry(collection).or_default();
        let actual = docs.get(id).map(|d| d.version);
        if actual != expected_version {
            return Err(StoreError::VersionMismatch {
                collection,
                id: id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        let doc = Document {
            id: id.to_string(),
            fields,
            version: actual.map_or(1, |v| v + 1),
        };
        docs.insert(id.to_string(), doc.clone());
        Ok(doc)
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
    ) -> Result<(), StoreError> {
        self.enter(&self.counters.mutations).await?;
        let mut guard = self.collections.lock();
        let Some(docs) = guard.get_mut(&collection) else {
            return match expected_version {
                Some(_) => Err(Self::not_found(collection, id)),
                None => Ok(()),
            };
        };
        match (docs.get(id).map(|d| d.version), expected_version) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(Self::not_found(collection, id)),
            (Some(actual), Some(expected)) if actual != expected => {
                Err(StoreError::VersionMismatch {
                    collection,
                    id: id.to_string(),
                    expected: Some(expected),
                    actual: Some(actual),
                })
            }
            (Some(_), _) => {
                docs.remove(id);
                Ok(())
            }
        }
    }
}
