//! Persisting catalog data into the local store.
//!
//! - `transform` - validation and entry → row conversion
//! - `patch` - minimal patch vs full refresh decisions
//! - `service` - `GameSyncService`, chunked upserts with per-row fallback
//! - `queue` - `SyncQueue`, background persistence with retry/backoff
//! - `backfill` - `BackfillService`, bulk refresh of incomplete rows

pub mod backfill;
pub mod patch;
pub mod queue;
pub mod service;
pub mod transform;

pub use backfill::{BACKFILL_SOURCE, BackfillReport, BackfillService};
pub use queue::{CatalogSink, ImmediateOutcome, QueueItem, QueueStatistics, SyncQueue};
pub use service::{GameSyncService, SyncMetrics, SyncReport};
