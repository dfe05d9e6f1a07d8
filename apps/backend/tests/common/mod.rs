#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use compat_backend::domain::{Comment, TestReport, WorkStatus};
use compat_backend::state::{Access, Session};
use compat_backend::store::memory::MemoryStore;
use compat_backend::store::{
    Collection, Document, DocumentStore, Fields, PageQuery, StoreError,
};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub mod proptest_prelude;

static LOGGING: OnceCell<()> = OnceCell::new();

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub const ADMIN: &str = "admin@compat.dev";
pub const MEMBER: &str = "player@mail.com";

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().expect("fixture must be a JSON object")
}

pub fn admin() -> Session {
    Session::with_access(ADMIN, Access::Admin)
}

pub fn member() -> Session {
    Session::with_access(MEMBER, Access::Member)
}

/// Seed a report and return it as the panel would show it.
pub fn seed_report(
    store: &MemoryStore,
    id: &str,
    game_id: &str,
    status: WorkStatus,
    updated_at: i64,
    archived: bool,
) -> TestReport {
    store.seed(
        Collection::Tests,
        id,
        fields(json!({
            "gameId": game_id,
            "authorEmail": MEMBER,
            "status": status,
            "device": "Pixel 7",
            "createdAtMillis": updated_at,
            "updatedAtMillis": updated_at,
            "archived": archived,
        })),
    );
    let mut report = TestReport::new(id, game_id, status, updated_at);
    report.archived = archived;
    report
}

pub fn seed_comment(
    store: &MemoryStore,
    collection: Collection,
    id: &str,
    parent_id: &str,
    text: &str,
    created_at: i64,
) -> Comment {
    store.seed(
        collection,
        id,
        fields(json!({
            "parentId": parent_id,
            "authorEmail": MEMBER,
            "text": text,
            "createdAtMillis": created_at,
        })),
    );
    Comment::new(id, parent_id, text, created_at)
}

/// Store wrapper where another writer slips in before compare-and-swap
/// calls: it appends `rival@mail.com` to the target record's `emails`.
pub struct RacingStore {
    pub inner: MemoryStore,
    interference: AtomicUsize,
}

impl RacingStore {
    pub fn new(interfering_writes: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            interference: AtomicUsize::new(interfering_writes),
        }
    }

    pub fn remaining_interference(&self) -> usize {
        self.interference.load(Ordering::SeqCst)
    }

    fn rival_write(&self, collection: Collection, id: &str) {
        let taken = self
            .interference
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !taken {
            return;
        }
        let mut body = self
            .inner
            .peek(collection, id)
            .map(|doc| doc.fields)
            .unwrap_or_default();
        let mut emails: Vec<Value> = body
            .get("emails")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if !emails.contains(&json!("rival@mail.com")) {
            emails.push(json!("rival@mail.com"));
        }
        body.insert("emails".into(), Value::Array(emails));
        self.inner.seed(collection, id, body);
    }
}

#[async_trait]
impl DocumentStore for RacingStore {
    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Document>, StoreError> {
        self.inner.query_page(query).await
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError> {
        self.inner.insert(collection, fields).await
    }

    async fn put(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document, StoreError> {
        self.inner.put(collection, id, fields).await
    }

    async fn overwrite(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError> {
        self.inner.overwrite(collection, id, fields, stamp_field).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        patch: Fields,
        stamp_field: Option<&str>,
    ) -> Result<Document, StoreError> {
        self.inner.update_fields(collection, id, patch, stamp_field).await
    }

    async fn compare_and_swap(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        self.rival_write(collection, id);
        self.inner
            .compare_and_swap(collection, id, expected_version, fields)
            .await
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        expected_version: Option<i64>,
    ) -> Result<(), StoreError> {
        self.inner.delete(collection, id, expected_version).await
    }
}
