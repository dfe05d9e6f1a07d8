//! Forward-only pagination over one ordered collection.
//!
//! A [`PagedQueryCursor`] remembers the last item of the most recent page and
//! fetches the next page strictly after it, newest first. It allows one fetch
//! in flight at a time and tags every fetch with the cursor generation it was
//! issued for: `reset()` starts a new generation, and a result that lands for
//! an older generation is dropped without touching the cursor.
//!
//! `has_more` is a heuristic: true iff the last page came back full. When the
//! remaining item count is an exact multiple of the page size, one extra
//! empty page is fetched before `has_more` turns false.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::errors::domain::DomainError;
use crate::repos::codec::{decode_all, StoredDoc};
use crate::store::{Collection, DocumentStore, PageCursor, PageQuery};

pub use crate::config::app::DEFAULT_PAGE_SIZE;

/// One fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

/// Outcome of a fetch request.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Page(Page<T>),
    /// Another fetch for this cursor is still pending; nothing was issued.
    Busy,
    /// The cursor was reset while this fetch was pending; its result was dropped.
    Superseded,
}

impl<T> Fetch<T> {
    pub fn into_page(self) -> Option<Page<T>> {
        match self {
            Fetch::Page(page) => Some(page),
            Fetch::Busy | Fetch::Superseded => None,
        }
    }
}

#[derive(Debug)]
struct CursorState {
    generation: u64,
    token: Option<PageCursor>,
    has_more: bool,
    in_flight: Option<u64>,
}

/// Clears the in-flight marker when a fetch finishes or its future is dropped.
struct InFlight<'a> {
    state: &'a Mutex<CursorState>,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.in_flight == Some(self.generation) {
            state.in_flight = None;
        }
    }
}

pub struct PagedQueryCursor<T> {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
    parent_id: Option<String>,
    page_size: usize,
    state: Mutex<CursorState>,
    _item: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for PagedQueryCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedQueryCursor")
            .field("collection", &self.collection)
            .field("parent_id", &self.parent_id)
            .field("page_size", &self.page_size)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl<T: StoredDoc> PagedQueryCursor<T> {
    pub fn new(store: Arc<dyn DocumentStore>, collection: Collection) -> Self {
        Self::with_page_size(store, collection, DEFAULT_PAGE_SIZE)
    }

    /// A page size of zero is treated as one.
    pub fn with_page_size(
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            collection,
            parent_id: None,
            page_size: page_size.max(1),
            state: Mutex::new(CursorState {
                generation: 0,
                token: None,
                has_more: true,
                in_flight: None,
            }),
            _item: PhantomData,
        }
    }

    /// Restrict the cursor to children of one parent document.
    pub fn for_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Back to the initial state (`has_more = true`, no token). Any fetch
    /// still pending is superseded.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.token = None;
        state.has_more = true;
        state.in_flight = None;
        debug!(collection = %self.collection, generation = state.generation, "cursor reset");
    }

    /// Newest `page_size` items; on success the cursor restarts from the top.
    /// A failed fetch leaves the previous token and `has_more` in place.
    pub async fn fetch_first_page(&self) -> Result<Fetch<T>, DomainError> {
        let generation = {
            let mut state = self.state.lock();
            if state.in_flight == Some(state.generation) {
                return Ok(Fetch::Busy);
            }
            state.in_flight = Some(state.generation);
            state.generation
        };
        self.run(generation, None).await
    }

    /// Items strictly after the stored token. Without a token this is an
    /// empty page and no query is issued.
    pub async fn fetch_next_page(&self) -> Result<Fetch<T>, DomainError> {
        let (generation, token) = {
            let mut state = self.state.lock();
            if state.in_flight == Some(state.generation) {
                return Ok(Fetch::Busy);
            }
            let Some(token) = state.token.clone() else {
                trace!(collection = %self.collection, "no cursor token, empty page");
                return Ok(Fetch::Page(Page::empty()));
            };
            state.in_flight = Some(state.generation);
            (state.generation, token)
        };
        self.run(generation, Some(token)).await
    }

    async fn run(&self, generation: u64, after: Option<PageCursor>) -> Result<Fetch<T>, DomainError> {
        let _in_flight = InFlight {
            state: &self.state,
            generation,
        };

        let mut query = PageQuery::new(self.collection, self.page_size);
        if let Some(parent) = &self.parent_id {
            query = query.for_parent(parent.as_str());
        }
        let first_page = after.is_none();
        if let Some(cursor) = after {
            query = query.after(cursor);
        }

        let docs = self.store.query_page(&query).await?;
        let last = docs.last().map(|doc| doc.page_cursor(self.collection));
        let has_more = docs.len() == self.page_size;
        let items = decode_all(self.collection, docs)?;

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    collection = %self.collection,
                    issued_for = generation,
                    current = state.generation,
                    "dropping stale page"
                );
                return Ok(Fetch::Superseded);
            }
            // A failed fetch never reaches here, so the previous position survives it.
            if first_page {
                state.token = last;
            } else if let Some(last) = last {
                state.token = Some(last);
            }
            state.has_more = has_more;
        }

        debug!(collection = %self.collection, count = items.len(), has_more, "page fetched");
        Ok(Fetch::Page(Page { items, has_more }))
    }
}
