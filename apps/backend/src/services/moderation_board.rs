//! State behind the admin moderation panel: one tab per content kind, each
//! with its own cursor and accumulated items.
//!
//! Every load is tagged with the tab and the tab epoch it was issued for.
//! Switching or refreshing a tab bumps the epoch; a load that lands for an
//! epoch the panel has since left is dropped and nothing is appended.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::{Comment, TestReport};
use crate::errors::domain::DomainError;
use crate::services::moderation::ContentKind;
use crate::services::paging::{Fetch, PagedQueryCursor};
use crate::store::DocumentStore;

/// What a load did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardLoad {
    Loaded { added: usize, has_more: bool },
    /// A load for this tab is already pending.
    Busy,
    /// The tab changed while loading; the result was dropped.
    Discarded,
}

#[derive(Debug)]
struct BoardView {
    active: ContentKind,
    epoch: u64,
    tests: Vec<TestReport>,
    test_comments: Vec<Comment>,
    game_comments: Vec<Comment>,
}

impl BoardView {
    fn comments_mut(&mut self, kind: ContentKind) -> Option<&mut Vec<Comment>> {
        match kind {
            ContentKind::TestComments => Some(&mut self.test_comments),
            ContentKind::GameComments => Some(&mut self.game_comments),
            ContentKind::Tests => None,
        }
    }

    fn clear(&mut self, kind: ContentKind) {
        match kind {
            ContentKind::Tests => self.tests.clear(),
            ContentKind::TestComments => self.test_comments.clear(),
            ContentKind::GameComments => self.game_comments.clear(),
        }
    }
}

#[derive(Debug)]
pub struct ModerationBoard {
    tests: PagedQueryCursor<TestReport>,
    test_comments: PagedQueryCursor<Comment>,
    game_comments: PagedQueryCursor<Comment>,
    view: Mutex<BoardView>,
}

impl ModerationBoard {
    /// Board positioned on the tests tab with nothing loaded.
    pub fn new(store: Arc<dyn DocumentStore>, page_size: usize) -> Self {
        Self {
            tests: PagedQueryCursor::with_page_size(
                store.clone(),
                ContentKind::Tests.collection(),
                page_size,
            ),
            test_comments: PagedQueryCursor::with_page_size(
                store.clone(),
                ContentKind::TestComments.collection(),
                page_size,
            ),
            game_comments: PagedQueryCursor::with_page_size(
                store,
                ContentKind::GameComments.collection(),
                page_size,
            ),
            view: Mutex::new(BoardView {
                active: ContentKind::Tests,
                epoch: 0,
                tests: Vec::new(),
                test_comments: Vec::new(),
                game_comments: Vec::new(),
            }),
        }
    }

    pub fn active_tab(&self) -> ContentKind {
        self.view.lock().active
    }

    /// Switch to `kind` and load its first page. The tab being left is reset
    /// so a load still pending for it is superseded.
    pub async fn select_tab(&self, kind: ContentKind) -> Result<BoardLoad, DomainError> {
        let (previous, epoch) = {
            let mut view = self.view.lock();
            let previous = view.active;
            view.active = kind;
            view.epoch += 1;
            view.clear(kind);
            (previous, view.epoch)
        };
        if previous != kind {
            self.reset_cursor(previous);
        }
        self.reset_cursor(kind);
        debug!(from = %previous, to = %kind, epoch, "board tab selected");
        self.load(kind, epoch, true).await
    }

    /// Drop the active tab's items and load its first page again.
    pub async fn refresh(&self) -> Result<BoardLoad, DomainError> {
        let kind = self.active_tab();
        self.select_tab(kind).await
    }

    /// Append the next page of the active tab.
    pub async fn load_more(&self) -> Result<BoardLoad, DomainError> {
        let (kind, epoch) = {
            let view = self.view.lock();
            (view.active, view.epoch)
        };
        self.load(kind, epoch, false).await
    }

    pub fn has_more(&self) -> bool {
        match self.active_tab() {
            ContentKind::Tests => self.tests.has_more(),
            ContentKind::TestComments => self.test_comments.has_more(),
            ContentKind::GameComments => self.game_comments.has_more(),
        }
    }

    pub fn tests(&self) -> Vec<TestReport> {
        self.view.lock().tests.clone()
    }

    /// Accumulated comments of a comment tab; empty for the tests tab.
    pub fn comments(&self, kind: ContentKind) -> Vec<Comment> {
        self.view
            .lock()
            .comments_mut(kind)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Swap in a report returned by a moderation call.
    pub fn replace_test(&self, report: TestReport) {
        let mut view = self.view.lock();
        if let Some(slot) = view.tests.iter_mut().find(|t| t.id == report.id) {
            *slot = report;
        }
    }

    pub fn replace_comment(&self, kind: ContentKind, comment: Comment) {
        let mut view = self.view.lock();
        if let Some(slot) = view
            .comments_mut(kind)
            .and_then(|list| list.iter_mut().find(|c| c.id == comment.id))
        {
            *slot = comment;
        }
    }

    /// Forget a deleted item.
    pub fn remove(&self, kind: ContentKind, id: &str) {
        let mut view = self.view.lock();
        match kind {
            ContentKind::Tests => view.tests.retain(|t| t.id != id),
            _ => {
                if let Some(list) = view.comments_mut(kind) {
                    list.retain(|c| c.id != id);
                }
            }
        }
    }

    fn reset_cursor(&self, kind: ContentKind) {
        match kind {
            ContentKind::Tests => self.tests.reset(),
            ContentKind::TestComments => self.test_comments.reset(),
            ContentKind::GameComments => self.game_comments.reset(),
        }
    }

    async fn load(&self, kind: ContentKind, epoch: u64, first: bool) -> Result<BoardLoad, DomainError> {
        match kind {
            ContentKind::Tests => {
                let fetch = if first {
                    self.tests.fetch_first_page().await?
                } else {
                    self.tests.fetch_next_page().await?
                };
                Ok(self.apply(kind, epoch, fetch, |view, items| view.tests.extend(items)))
            }
            ContentKind::TestComments | ContentKind::GameComments => {
                let cursor = if kind == ContentKind::TestComments {
                    &self.test_comments
                } else {
                    &self.game_comments
                };
                let fetch = if first {
                    cursor.fetch_first_page().await?
                } else {
                    cursor.fetch_next_page().await?
                };
                Ok(self.apply(kind, epoch, fetch, |view, items| {
                    if let Some(list) = view.comments_mut(kind) {
                        list.extend(items);
                    }
                }))
            }
        }
    }

    fn apply<T>(
        &self,
        kind: ContentKind,
        epoch: u64,
        fetch: Fetch<T>,
        append: impl FnOnce(&mut BoardView, Vec<T>),
    ) -> BoardLoad {
        let page = match fetch {
            Fetch::Page(page) => page,
            Fetch::Busy => return BoardLoad::Busy,
            Fetch::Superseded => return BoardLoad::Discarded,
        };

        let mut view = self.view.lock();
        if view.active != kind || view.epoch != epoch {
            debug!(tab = %kind, issued_for = epoch, current = view.epoch, "dropping load for abandoned tab");
            return BoardLoad::Discarded;
        }
        let added = page.items.len();
        append(&mut view, page.items);
        BoardLoad::Loaded {
            added,
            has_more: page.has_more,
        }
    }
}
