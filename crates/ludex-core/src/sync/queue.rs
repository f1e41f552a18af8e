//! Background persistence queue.
//!
//! Newly discovered catalog entries are handed to [`SyncQueue::add`] and
//! written by a single background loop. Failed batches are retried with
//! exponential backoff and parked in a failed list once they run out of
//! attempts.
//!
//! # Design
//!
//! - `Backlog` is a pure synchronous state machine (no I/O)
//! - `SyncQueue` drives it from spawned tasks, holding the lock only
//!   between awaits
//! - Timer tasks hold a `Weak` reference and stop once the queue is dropped

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::service::SyncReport;
use crate::config::SyncQueueConfig;
use crate::domain::CatalogEntry;
use crate::ports::CoreError;

/// Where queued batches are persisted.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    async fn persist(&self, batch: &[CatalogEntry]) -> Result<SyncReport, CoreError>;
}

/// One batch waiting to be persisted.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: u64,
    pub entries: Vec<CatalogEntry>,
    /// Failed attempts so far.
    pub retry_count: u32,
    pub enqueued_at: Instant,
    /// Last error, for parked items.
    pub last_error: Option<String>,
}

/// Read-only view of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatistics {
    pub pending: usize,
    pub failed: usize,
    /// Batches waiting out a backoff delay.
    pub awaiting_retry: usize,
    pub processing: bool,
    /// Batches ever added (retries not counted).
    pub total_queued: u64,
    pub total_persisted: u64,
    pub oldest_pending_age: Option<Duration>,
}

/// Result of [`SyncQueue::process_immediate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmediateOutcome {
    Persisted(SyncReport),
    /// The direct attempt failed; the batch was queued instead.
    Queued,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backlog (pure state)
// ─────────────────────────────────────────────────────────────────────────────

/// What to do with a batch after a failed attempt.
#[derive(Debug, PartialEq, Eq)]
enum FailureAction {
    RetryAfter(Duration),
    Parked,
}

#[derive(Debug, Default)]
struct Backlog {
    pending: VecDeque<QueueItem>,
    failed: Vec<QueueItem>,
    processing: bool,
    awaiting_retry: usize,
    total_queued: u64,
    total_persisted: u64,
    next_id: u64,
}

impl Backlog {
    fn push(&mut self, entries: Vec<CatalogEntry>, now: Instant) -> u64 {
        self.next_id += 1;
        self.total_queued += 1;
        self.pending.push_back(QueueItem {
            id: self.next_id,
            entries,
            retry_count: 0,
            enqueued_at: now,
            last_error: None,
        });
        self.next_id
    }

    /// Claim the processing flag if there is work and nobody holds it.
    fn try_start(&mut self) -> bool {
        if self.processing || self.pending.is_empty() {
            return false;
        }
        self.processing = true;
        true
    }

    /// Next batch for the running loop; releases the flag when empty.
    fn next(&mut self) -> Option<QueueItem> {
        let item = self.pending.pop_front();
        if item.is_none() {
            self.processing = false;
        }
        item
    }

    fn on_failure(
        &mut self,
        mut item: QueueItem,
        error: &CoreError,
        config: &SyncQueueConfig,
    ) -> (FailureAction, Option<QueueItem>) {
        item.retry_count += 1;
        item.last_error = Some(error.to_string());
        if item.retry_count >= config.max_retries {
            self.failed.push(item);
            (FailureAction::Parked, None)
        } else {
            self.awaiting_retry += 1;
            (
                FailureAction::RetryAfter(config.backoff_for(item.retry_count)),
                Some(item),
            )
        }
    }

    fn requeue(&mut self, item: QueueItem) {
        self.awaiting_retry = self.awaiting_retry.saturating_sub(1);
        self.pending.push_back(item);
    }

    fn retry_failed(&mut self) -> usize {
        let moved = self.failed.len();
        for mut item in self.failed.drain(..) {
            item.retry_count = 0;
            self.pending.push_back(item);
        }
        moved
    }

    fn is_idle(&self) -> bool {
        !self.processing && self.pending.is_empty()
    }

    fn statistics(&self, now: Instant) -> QueueStatistics {
        QueueStatistics {
            pending: self.pending.len(),
            failed: self.failed.len(),
            awaiting_retry: self.awaiting_retry,
            processing: self.processing,
            total_queued: self.total_queued,
            total_persisted: self.total_persisted,
            oldest_pending_age: self
                .pending
                .iter()
                .map(|item| now.duration_since(item.enqueued_at))
                .max(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncQueue (driver)
// ─────────────────────────────────────────────────────────────────────────────

/// FIFO persistence queue with a single processing loop.
pub struct SyncQueue {
    sink: Arc<dyn CatalogSink>,
    config: SyncQueueConfig,
    backlog: Mutex<Backlog>,
    idle: Notify,
    ticker: Mutex<Option<JoinHandle<()>>>,
    this: Weak<SyncQueue>,
}

impl SyncQueue {
    pub fn new(sink: Arc<dyn CatalogSink>, config: SyncQueueConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            sink,
            config,
            backlog: Mutex::new(Backlog::default()),
            idle: Notify::new(),
            ticker: Mutex::new(None),
            this: this.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Backlog> {
        self.backlog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the periodic tick that restarts processing. Idempotent.
    pub fn start(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime; sync queue ticker not started");
            return;
        };
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if ticker.is_some() {
            return;
        }

        let this = self.this.clone();
        let period = self.config.tick_interval;
        *ticker = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(queue) = this.upgrade() else { break };
                queue.kick();
            }
        }));
    }

    /// Queue a batch and start processing if idle. Never waits.
    pub fn add(&self, entries: Vec<CatalogEntry>) {
        if entries.is_empty() {
            return;
        }
        let count = entries.len();
        let id = self.lock().push(entries, Instant::now());
        debug!(batch = id, entries = count, "Queued catalog batch");
        self.kick();
    }

    /// Persist a batch right away, queueing it if that fails.
    pub async fn process_immediate(&self, entries: Vec<CatalogEntry>) -> ImmediateOutcome {
        match self.sink.persist(&entries).await {
            Ok(report) => {
                self.lock().total_persisted += 1;
                ImmediateOutcome::Persisted(report)
            }
            Err(e) => {
                warn!(error = %e, "Immediate sync failed, queueing batch");
                self.add(entries);
                ImmediateOutcome::Queued
            }
        }
    }

    /// Move every parked batch back into the queue with a fresh retry
    /// budget. Returns how many were moved.
    pub fn retry_failed(&self) -> usize {
        let moved = self.lock().retry_failed();
        if moved > 0 {
            info!(batches = moved, "Retrying failed sync batches");
            self.kick();
        }
        moved
    }

    pub fn statistics(&self) -> QueueStatistics {
        self.lock().statistics(Instant::now())
    }

    /// Snapshot of queued batches, in processing order.
    pub fn pending_items(&self) -> Vec<QueueItem> {
        self.lock().pending.iter().cloned().collect()
    }

    /// Snapshot of parked batches.
    pub fn failed_items(&self) -> Vec<QueueItem> {
        self.lock().failed.clone()
    }

    /// Wait until nothing is queued and no loop is running.
    ///
    /// Batches waiting out a backoff delay are not waited for.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }

    fn kick(&self) {
        if !self.lock().try_start() {
            return;
        }
        let Some(queue) = self.this.upgrade() else {
            self.lock().processing = false;
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { queue.run().await });
            }
            Err(_) => {
                warn!("No tokio runtime; sync queue left pending");
                self.lock().processing = false;
            }
        }
    }

    async fn run(self: Arc<Self>) {
        let mut first = true;
        loop {
            let Some(item) = self.lock().next() else {
                self.idle.notify_waiters();
                return;
            };

            if !first {
                tokio::time::sleep(self.config.batch_delay).await;
            }
            first = false;

            match self.sink.persist(&item.entries).await {
                Ok(report) => {
                    self.lock().total_persisted += 1;
                    debug!(
                        batch = item.id,
                        inserted = report.inserted,
                        updated = report.updated,
                        "Persisted catalog batch"
                    );
                }
                Err(e) => self.on_failure(item, &e),
            }
        }
    }

    fn on_failure(&self, item: QueueItem, error: &CoreError) {
        let batch = item.id;
        let (action, retry) = self.lock().on_failure(item, error, &self.config);
        match (action, retry) {
            (FailureAction::RetryAfter(delay), Some(item)) => {
                warn!(
                    batch,
                    attempt = item.retry_count,
                    retry_in_secs = delay.as_secs(),
                    error = %error,
                    "Sync batch failed, will retry"
                );
                let this = self.this.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(queue) = this.upgrade() {
                        queue.lock().requeue(item);
                        queue.kick();
                    }
                });
            }
            _ => {
                warn!(batch, error = %error, "Sync batch failed permanently, parked");
            }
        }
    }
}

impl Drop for SyncQueue {
    fn drop(&mut self) {
        let ticker = self.ticker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SyncQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncQueue")
            .field("config", &self.config)
            .field("statistics", &self.statistics())
            .finish_non_exhaustive()
    }
}
