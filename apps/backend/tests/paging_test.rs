mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{proptest_prelude::proptest_prelude_config, seed_comment, seed_report};
use compat_backend::domain::{Comment, TestReport, WorkStatus};
use compat_backend::services::{Fetch, PagedQueryCursor, DEFAULT_PAGE_SIZE};
use compat_backend::store::memory::MemoryStore;
use compat_backend::store::{Collection, StoreError};
use proptest::prelude::*;

fn store_with_reports(n: usize) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for i in 0..n {
        seed_report(&store, &format!("t{i:03}"), "g1", WorkStatus::Working, 1_000 + i as i64, false);
    }
    store
}

fn tests_cursor(store: &Arc<MemoryStore>) -> PagedQueryCursor<TestReport> {
    PagedQueryCursor::new(store.clone(), Collection::Tests)
}

#[tokio::test]
async fn full_first_page_reports_more() {
    let store = store_with_reports(6);
    let cursor = tests_cursor(&store);
    assert_eq!(cursor.page_size(), DEFAULT_PAGE_SIZE);

    let page = cursor.fetch_first_page().await.unwrap().into_page().unwrap();
    assert_eq!(page.items.len(), 6);
    assert!(page.has_more);
}

#[tokio::test]
async fn short_first_page_reports_no_more() {
    let store = store_with_reports(5);
    let cursor = tests_cursor(&store);

    let page = cursor.fetch_first_page().await.unwrap().into_page().unwrap();
    assert_eq!(page.items.len(), 5);
    assert!(!page.has_more);
}

#[tokio::test]
async fn failed_refresh_keeps_the_loaded_position() {
    let store = store_with_reports(12);
    let cursor = tests_cursor(&store);
    cursor.fetch_first_page().await.unwrap();

    store.fail_next(StoreError::Timeout);
    assert!(cursor.fetch_first_page().await.is_err());
    assert!(cursor.has_more());

    let page = cursor.fetch_next_page().await.unwrap().into_page().unwrap();
    let ids: Vec<_> = page.items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["t005", "t004", "t003", "t002", "t001", "t000"]);
    assert_eq!(cursor.has_more(), page.has_more);
}

#[tokio::test]
async fn concurrent_next_page_issues_one_query() {
    let store = store_with_reports(12);
    let cursor = tests_cursor(&store);
    cursor.fetch_first_page().await.unwrap();
    let before = store.counts().queries;

    store.set_latency(Some(Duration::from_millis(40)));
    let (a, b) = tokio::join!(cursor.fetch_next_page(), cursor.fetch_next_page());
    store.set_latency(None);

    let outcomes = [a.unwrap(), b.unwrap()];
    let pages: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match o {
            Fetch::Page(page) => Some(page),
            _ => None,
        })
        .collect();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].items.len(), 6);
    assert!(outcomes.iter().any(|o| matches!(o, Fetch::Busy)));
    assert_eq!(store.counts().queries, before + 1);

    // The appended page is the second one; the cursor moved exactly once
    let ids: Vec<_> = pages[0].items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["t005", "t004", "t003", "t002", "t001", "t000"]);
}

#[tokio::test]
async fn double_first_page_request_is_dropped() {
    let store = store_with_reports(3);
    let cursor = tests_cursor(&store);

    store.set_latency(Some(Duration::from_millis(20)));
    let (a, b) = tokio::join!(cursor.fetch_first_page(), cursor.fetch_first_page());

    assert!(matches!(a.unwrap(), Fetch::Page(_)));
    assert_eq!(b.unwrap(), Fetch::Busy);
    assert_eq!(store.counts().queries, 1);
}

#[tokio::test]
async fn result_landing_after_reset_is_discarded() {
    let store = store_with_reports(12);
    let cursor = tests_cursor(&store);
    cursor.fetch_first_page().await.unwrap();

    store.set_latency(Some(Duration::from_millis(30)));
    let (stale, ()) = tokio::join!(cursor.fetch_next_page(), async { cursor.reset() });
    store.set_latency(None);

    assert_eq!(stale.unwrap(), Fetch::Superseded);
    assert!(cursor.has_more());

    // No token after the reset, so nothing is fetched
    let queries = store.counts().queries;
    let page = cursor.fetch_next_page().await.unwrap().into_page().unwrap();
    assert!(page.items.is_empty());
    assert_eq!(store.counts().queries, queries);

    // A new first page starts from the top again
    let first = cursor.fetch_first_page().await.unwrap().into_page().unwrap();
    assert_eq!(first.items[0].id, "t011");
}

#[tokio::test]
async fn cancelled_fetch_does_not_block_the_cursor() {
    let store = store_with_reports(8);
    let cursor = tests_cursor(&store);

    store.set_latency(Some(Duration::from_millis(200)));
    let timed_out = tokio::time::timeout(Duration::from_millis(10), cursor.fetch_first_page()).await;
    assert!(timed_out.is_err());
    store.set_latency(None);

    let page = cursor.fetch_first_page().await.unwrap();
    assert!(matches!(page, Fetch::Page(_)));
}

#[tokio::test]
async fn comment_cursor_filters_by_parent() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..4 {
        seed_comment(&store, Collection::TestComments, &format!("c{i}"), "t1", "same here", 10 + i);
    }
    seed_comment(&store, Collection::TestComments, "x", "t2", "different test", 99);

    let cursor: PagedQueryCursor<Comment> =
        PagedQueryCursor::with_page_size(store.clone(), Collection::TestComments, 3).for_parent("t1");
    let first = cursor.fetch_first_page().await.unwrap().into_page().unwrap();
    let next = cursor.fetch_next_page().await.unwrap().into_page().unwrap();

    let ids: Vec<_> = first.items.iter().chain(&next.items).map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c3", "c2", "c1", "c0"]);
    assert!(!next.has_more);
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Walking every page yields each item exactly once, newest first.
    #[test]
    fn prop_walk_visits_everything_once(n in 0usize..20, page_size in 1usize..8) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let store = store_with_reports(n);
        let cursor: PagedQueryCursor<TestReport> =
            PagedQueryCursor::with_page_size(store.clone(), Collection::Tests, page_size);

        let seen = rt.block_on(async {
            let mut seen = Vec::new();
            let mut page = cursor.fetch_first_page().await.unwrap().into_page().unwrap();
            loop {
                seen.extend(page.items.iter().map(|r| r.updated_at_millis));
                if !page.has_more {
                    break;
                }
                page = cursor.fetch_next_page().await.unwrap().into_page().unwrap();
            }
            seen
        });

        let expected: Vec<i64> = (0..n as i64).rev().map(|i| 1_000 + i).collect();
        prop_assert_eq!(seen, expected);
        // At most one trailing empty page beyond ceil(n / page_size)
        let max_queries = n / page_size + 1;
        prop_assert!(store.counts().queries <= max_queries);
    }
}
