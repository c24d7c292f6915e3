//! Integration tests for the sync driver.
//!
//! These tests use the real SyncDriver but mock dependencies (RowSource,
//! SearchIndexProvider and WatermarkStore) to exercise watermark
//! semantics, paging, and failure isolation between entity kinds.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use movies_etl::driver::{DriverConfig, SyncDriver};
use movies_etl::errors::SyncError;
use movies_etl::extractor::{MediaRow, PersonRow, RawRow, RowSource};
use movies_etl::loader::SearchLoader;
use movies_etl::retry::RetryPolicy;
use movies_etl::watermark::WatermarkStore;
use movies_search_repository::{BulkDocument, PageRequest, SearchIndexError, SearchIndexProvider};
use movies_search_shared::EntityKind;

/// Mock row source holding a fixed row set per kind.
///
/// `fetch_page` honors the real contract: rows modified strictly after
/// `since`, ordered by modification time, paged by offset/limit.
struct MockRowSource {
    rows: Mutex<HashMap<EntityKind, Vec<RawRow>>>,
    fail_kinds: HashSet<EntityKind>,
}

impl MockRowSource {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            fail_kinds: HashSet::new(),
        }
    }

    fn with_rows(kind: EntityKind, rows: Vec<RawRow>) -> Self {
        let source = Self::new();
        source.rows.lock().unwrap().insert(kind, rows);
        source
    }

    fn failing_for(mut self, kind: EntityKind) -> Self {
        self.fail_kinds.insert(kind);
        self
    }

    fn add_rows(&self, kind: EntityKind, rows: Vec<RawRow>) {
        self.rows.lock().unwrap().entry(kind).or_default().extend(rows);
    }
}

#[async_trait]
impl RowSource for MockRowSource {
    async fn fetch_page(
        &self,
        kind: EntityKind,
        since: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RawRow>, SyncError> {
        if self.fail_kinds.contains(&kind) {
            return Err(SyncError::extract("relational store unreachable"));
        }

        let rows = self.rows.lock().unwrap();
        let mut page: Vec<RawRow> = rows
            .get(&kind)
            .map(|all| {
                all.iter()
                    .filter(|row| row.modified() > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        page.sort_by_key(|row| row.modified());

        Ok(page
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// Mock search provider storing documents per (index, id).
struct MockProvider {
    documents: Mutex<HashMap<(String, String), Value>>,
    bulk_calls: AtomicU32,
    fail_first: AtomicU32,
    shutdown_on_bulk: Mutex<Option<Arc<SyncDriver>>>,
}

impl MockProvider {
    fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            bulk_calls: AtomicU32::new(0),
            fail_first: AtomicU32::new(0),
            shutdown_on_bulk: Mutex::new(None),
        }
    }

    fn failing_first(fail_first: u32) -> Self {
        let provider = Self::new();
        provider.fail_first.store(fail_first, Ordering::SeqCst);
        provider
    }

    /// Request a driver shutdown from inside the next bulk upsert, as a
    /// signal arriving while a batch is being indexed would.
    fn shutdown_driver_on_next_bulk(&self, driver: Arc<SyncDriver>) {
        self.shutdown_on_bulk.lock().unwrap().replace(driver);
    }

    fn count_in(&self, index: &str) -> usize {
        self.documents
            .lock()
            .unwrap()
            .keys()
            .filter(|(idx, _)| idx == index)
            .count()
    }
}

#[async_trait]
impl SearchIndexProvider for MockProvider {
    async fn ensure_indexes_exist(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[BulkDocument],
    ) -> Result<(), SearchIndexError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first.load(Ordering::SeqCst) > 0 {
            self.fail_first.fetch_sub(1, Ordering::SeqCst);
            return Err(SearchIndexError::connection("index unreachable"));
        }
        let mut stored = self.documents.lock().unwrap();
        for doc in documents {
            stored.insert((index.to_string(), doc.id.clone()), doc.source.clone());
        }
        drop(stored);

        if let Some(driver) = self.shutdown_on_bulk.lock().unwrap().take() {
            driver.shutdown();
        }
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<Option<Value>, SearchIndexError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(&(index.to_string(), id.to_string()))
            .cloned())
    }

    async fn search_page(
        &self,
        _index: &str,
        _page: &PageRequest,
    ) -> Result<Vec<Value>, SearchIndexError> {
        Ok(vec![])
    }
}

/// In-memory watermark store.
struct MockWatermarkStore {
    marks: Mutex<HashMap<EntityKind, DateTime<Utc>>>,
}

impl MockWatermarkStore {
    fn new() -> Self {
        Self {
            marks: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, kind: EntityKind) -> DateTime<Utc> {
        self.marks
            .lock()
            .unwrap()
            .get(&kind)
            .copied()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn reset(&self, kind: EntityKind) {
        self.marks.lock().unwrap().remove(&kind);
    }
}

#[async_trait]
impl WatermarkStore for MockWatermarkStore {
    async fn load(&self, kind: EntityKind) -> Result<DateTime<Utc>, SyncError> {
        Ok(self.get(kind))
    }

    async fn store(&self, kind: EntityKind, modified: DateTime<Utc>) -> Result<(), SyncError> {
        self.marks.lock().unwrap().insert(kind, modified);
        Ok(())
    }
}

fn at(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, secs).unwrap()
}

fn media_row(title: &str, modified: DateTime<Utc>) -> RawRow {
    RawRow::Media(MediaRow {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        rating: Some(7.0),
        genres: vec!["Drama".to_string()],
        persons: "[]".to_string(),
        modified,
    })
}

fn person_row(name: &str, modified: DateTime<Utc>) -> RawRow {
    RawRow::Person(PersonRow {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        media_ids: vec![],
        modified,
    })
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
    }
}

fn driver(
    source: MockRowSource,
    provider: Arc<MockProvider>,
    watermarks: Arc<MockWatermarkStore>,
    page_size: i64,
    retry: RetryPolicy,
) -> SyncDriver {
    SyncDriver::with_config(
        Arc::new(source),
        SearchLoader::with_policy(provider, retry),
        watermarks,
        DriverConfig {
            poll_interval: Duration::from_secs(1),
            page_size,
        },
    )
}

#[tokio::test]
async fn test_empty_source_reaches_empty_without_advancing_watermarks() {
    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(
        MockRowSource::new(),
        provider.clone(),
        watermarks.clone(),
        100,
        fast_retry(3),
    );

    let synced = driver.run_cycle().await;

    assert_eq!(synced, 0);
    assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 0);
    for kind in EntityKind::ALL {
        assert_eq!(watermarks.get(kind), DateTime::UNIX_EPOCH);
    }
}

#[tokio::test]
async fn test_cycle_pages_until_empty_and_advances_watermark_to_max() {
    let source = MockRowSource::with_rows(
        EntityKind::Media,
        vec![
            media_row("First", at(1)),
            media_row("Second", at(2)),
            media_row("Third", at(3)),
        ],
    );
    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(source, provider.clone(), watermarks.clone(), 2, fast_retry(3));

    let synced = driver.run_cycle().await;

    assert_eq!(synced, 3);
    assert_eq!(provider.count_in("movies"), 3);
    // Two non-empty pages of size 2
    assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 2);
    assert_eq!(watermarks.get(EntityKind::Media), at(3));
}

#[tokio::test]
async fn test_failing_kind_does_not_block_others() {
    let source = MockRowSource::with_rows(
        EntityKind::Person,
        vec![person_row("Andrei Tarkovsky", at(5))],
    )
    .failing_for(EntityKind::Media);

    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(source, provider.clone(), watermarks.clone(), 100, fast_retry(1));

    let synced = driver.run_cycle().await;

    assert_eq!(synced, 1);
    assert_eq!(provider.count_in("persons"), 1);
    assert_eq!(watermarks.get(EntityKind::Person), at(5));
    assert_eq!(watermarks.get(EntityKind::Media), DateTime::UNIX_EPOCH);
}

#[tokio::test(start_paused = true)]
async fn test_transient_load_failure_then_success_indexes_once() {
    let source = MockRowSource::with_rows(
        EntityKind::Media,
        vec![media_row("Solaris", at(1)), media_row("Mirror", at(2))],
    );
    let provider = Arc::new(MockProvider::failing_first(1));
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(source, provider.clone(), watermarks.clone(), 100, fast_retry(3));

    let synced = driver.run_cycle().await;

    assert_eq!(synced, 2);
    // One failed attempt plus one successful retry
    assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 2);
    assert_eq!(provider.count_in("movies"), 2);
    assert_eq!(watermarks.get(EntityKind::Media), at(2));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_load_leaves_watermark_unchanged() {
    let source =
        MockRowSource::with_rows(EntityKind::Media, vec![media_row("Solaris", at(1))]);
    let provider = Arc::new(MockProvider::failing_first(u32::MAX));
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(source, provider.clone(), watermarks.clone(), 100, fast_retry(3));

    let synced = driver.run_cycle().await;

    assert_eq!(synced, 0);
    assert_eq!(provider.count_in("movies"), 0);
    assert_eq!(watermarks.get(EntityKind::Media), DateTime::UNIX_EPOCH);
}

#[tokio::test]
async fn test_watermark_is_monotonic_across_cycles() {
    let source = MockRowSource::new();
    source.add_rows(EntityKind::Media, vec![media_row("Solaris", at(10))]);

    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(source, provider.clone(), watermarks.clone(), 100, fast_retry(3));

    driver.run_cycle().await;
    assert_eq!(watermarks.get(EntityKind::Media), at(10));

    // Second cycle finds nothing newer: watermark must not move back
    let synced = driver.run_cycle().await;
    assert_eq!(synced, 0);
    assert_eq!(watermarks.get(EntityKind::Media), at(10));
}

#[tokio::test]
async fn test_shutdown_mid_cycle_stops_after_current_batch() {
    let source = MockRowSource::with_rows(
        EntityKind::Media,
        vec![
            media_row("Solaris", at(1)),
            media_row("Stalker", at(2)),
            media_row("Mirror", at(3)),
        ],
    );
    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = Arc::new(driver(
        source,
        provider.clone(),
        watermarks.clone(),
        1,
        fast_retry(3),
    ));

    // Shutdown arrives while the first one-row batch is being indexed
    provider.shutdown_driver_on_next_bulk(driver.clone());

    let synced = driver.run_cycle().await;

    // The in-flight batch completed and its watermark advanced, but no
    // further page was extracted
    assert_eq!(synced, 1);
    assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.count_in("movies"), 1);
    assert_eq!(watermarks.get(EntityKind::Media), at(1));
}

#[tokio::test]
async fn test_run_returns_without_sleeping_once_shutdown_is_requested() {
    let source = MockRowSource::with_rows(
        EntityKind::Media,
        vec![media_row("Solaris", at(1))],
    );
    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = Arc::new(driver(
        source,
        provider.clone(),
        watermarks.clone(),
        100,
        fast_retry(3),
    ));

    provider.shutdown_driver_on_next_bulk(driver.clone());

    // Must complete the first cycle and return instead of entering the
    // poll-interval sleep
    driver.run().await.unwrap();

    assert_eq!(provider.count_in("movies"), 1);
    assert_eq!(watermarks.get(EntityKind::Media), at(1));
}

#[tokio::test]
async fn test_replay_after_watermark_reset_is_idempotent() {
    let source = MockRowSource::with_rows(
        EntityKind::Media,
        vec![media_row("Solaris", at(1)), media_row("Stalker", at(2))],
    );
    let provider = Arc::new(MockProvider::new());
    let watermarks = Arc::new(MockWatermarkStore::new());
    let driver = driver(source, provider.clone(), watermarks.clone(), 100, fast_retry(3));

    driver.run_cycle().await;
    let after_first = provider.documents.lock().unwrap().clone();

    // Simulate a crash that lost the watermark advance: the same rows
    // are re-extracted and re-indexed
    watermarks.reset(EntityKind::Media);
    driver.run_cycle().await;
    let after_second = provider.documents.lock().unwrap().clone();

    assert_eq!(after_first, after_second);
}
