//! In-flight request deduplication.
//!
//! Concurrent calls with the same key share one execution. The key is
//! forgotten once that execution finishes, so later calls run afresh.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// Single-flight table keyed by operation + arguments.
pub struct InFlight<T> {
    calls: Mutex<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T: Clone> InFlight<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` unless an identical call is already running, in which case
    /// wait for and clone its result.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            match calls.get(key) {
                Some(cell) => {
                    tracing::trace!(key, "Joining in-flight call");
                    Arc::clone(cell)
                }
                None => {
                    let cell = Arc::new(OnceCell::new());
                    calls.insert(key.to_string(), Arc::clone(&cell));
                    cell
                }
            }
        };

        let value = cell.get_or_init(work).await.clone();

        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        if calls.get(key).is_some_and(|current| Arc::ptr_eq(current, &cell)) {
            calls.remove(key);
        }
        value
    }

    /// Number of distinct calls currently running.
    pub fn len(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for InFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight").finish_non_exhaustive()
    }
}
