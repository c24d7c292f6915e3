//! The sync driver.
//!
//! Coordinates extract, transform and load for every entity kind on a
//! polling cadence, advancing each kind's watermark only after its batch
//! is durably indexed. A crash between load and watermark advance causes
//! a harmless re-index on restart, which the loader's upsert absorbs:
//! the pipeline is at-least-once, never lossy.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use movies_search_shared::EntityKind;

use crate::errors::SyncError;
use crate::extractor::{RawRow, RowSource};
use crate::loader::SearchLoader;
use crate::transformer;
use crate::watermark::WatermarkStore;

/// Configuration for the sync driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Sleep between cycles once every kind has drained.
    pub poll_interval: Duration,
    /// Rows per extraction page.
    pub page_size: i64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            page_size: 100,
        }
    }
}

/// Driver that runs the sync loop.
///
/// The driver:
/// - Pages each entity kind from its watermark until an empty page
/// - Advances the watermark only after the loader confirms a batch
/// - Processes kinds independently, so one kind's failure does not
///   block another's progress
/// - Stops cleanly on shutdown, letting the in-flight batch finish
pub struct SyncDriver {
    source: Arc<dyn RowSource>,
    loader: SearchLoader,
    watermarks: Arc<dyn WatermarkStore>,
    config: DriverConfig,
    shutdown_tx: broadcast::Sender<()>,
    /// Set once shutdown is requested; checked between batches so the
    /// in-flight batch always completes.
    shutdown_flag: Arc<AtomicBool>,
    /// Total rows synchronized since startup.
    total_rows_synced: AtomicU64,
}

impl SyncDriver {
    /// Create a driver with default configuration.
    pub fn new(
        source: Arc<dyn RowSource>,
        loader: SearchLoader,
        watermarks: Arc<dyn WatermarkStore>,
    ) -> Self {
        Self::with_config(source, loader, watermarks, DriverConfig::default())
    }

    /// Create a driver with custom configuration.
    pub fn with_config(
        source: Arc<dyn RowSource>,
        loader: SearchLoader,
        watermarks: Arc<dyn WatermarkStore>,
        config: DriverConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            source,
            loader,
            watermarks,
            config,
            shutdown_tx,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            total_rows_synced: AtomicU64::new(0),
        }
    }

    /// Run the sync loop until a shutdown signal arrives.
    ///
    /// Each cycle drains every entity kind, then the driver sleeps the
    /// poll interval. A SIGINT listener stays registered for the whole
    /// run, so a signal arriving mid-cycle is recorded and observed
    /// right after the in-flight batch completes; the batch itself
    /// always runs to completion (or fails) without corrupting its
    /// watermark.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), SyncError> {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            page_size = self.config.page_size,
            "Starting sync driver"
        );

        let flag = Arc::clone(&self.shutdown_flag);
        let tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
                flag.store(true, Ordering::SeqCst);
                let _ = tx.send(());
            }
        });

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            let synced = self.run_cycle().await;
            debug!(rows = synced, "Sync cycle complete");

            if self.shutdown_flag.load(Ordering::SeqCst) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        info!(
            total_rows_synced = self.total_rows_synced.load(Ordering::Relaxed),
            "Sync driver stopped"
        );
        Ok(())
    }

    /// Run one full cycle over all entity kinds.
    ///
    /// A kind that fails is logged and skipped for this cycle; its
    /// watermark is untouched so the next cycle retries the same range.
    /// Returns the number of rows synchronized.
    pub async fn run_cycle(&self) -> u64 {
        let mut cycle_total = 0u64;

        for kind in EntityKind::ALL {
            if self.shutdown_flag.load(Ordering::SeqCst) {
                info!(kind = %kind, "Shutdown requested, skipping remaining kinds");
                break;
            }

            match self.sync_kind(kind).await {
                Ok(count) => {
                    if count > 0 {
                        info!(kind = %kind, rows = count, "Kind synchronized");
                    }
                    cycle_total += count;
                }
                Err(e) => {
                    error!(kind = %kind, error = %e, "Sync failed for kind, will retry next cycle");
                }
            }
        }

        self.total_rows_synced
            .fetch_add(cycle_total, Ordering::Relaxed);
        cycle_total
    }

    /// Page one kind from its watermark until an empty page.
    #[instrument(skip(self), fields(kind = %kind))]
    async fn sync_kind(&self, kind: EntityKind) -> Result<u64, SyncError> {
        let since = self.watermarks.load(kind).await?;
        let limit = self.config.page_size;
        let mut high_water = since;
        let mut offset = 0i64;
        let mut synced = 0u64;

        loop {
            let rows = self.source.fetch_page(kind, since, offset, limit).await?;
            if rows.is_empty() {
                // EMPTY: this kind is drained for the cycle
                break;
            }

            let page_max = rows
                .iter()
                .map(RawRow::modified)
                .max()
                .unwrap_or(high_water);

            let documents = transformer::transform_batch(&rows);
            self.loader.load(kind.index(), &documents).await?;

            // The batch is durably indexed; only now may the watermark
            // move. It covers rejected rows too, so a permanently
            // malformed row cannot stall the kind.
            if page_max > high_water {
                self.watermarks.store(kind, page_max).await?;
                high_water = page_max;
            }

            synced += rows.len() as u64;
            offset += limit;

            if self.shutdown_flag.load(Ordering::SeqCst) {
                debug!(kind = %kind, "Shutdown requested, stopping after current batch");
                break;
            }
        }

        Ok(synced)
    }

    /// Trigger a graceful shutdown. The in-flight batch completes and
    /// its watermark advances before the driver stops.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }
}
