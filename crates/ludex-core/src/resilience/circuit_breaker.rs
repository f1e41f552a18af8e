//! Three-state circuit breaker guarding the remote catalog.
//!
//! ```text
//! CLOSED --(threshold failures)--> OPEN --(timeout elapsed)--> HALF_OPEN
//!   ^                                ^                             |
//!   |                                +------(any failure)----------+
//!   +----------------(probe limit successes)-----------------------+
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::CircuitBreakerConfig;
use crate::ports::{CatalogError, CatalogResult};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are rejected until the open timeout elapses.
    Open,
    /// A limited number of probe calls are let through.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of the breaker counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub probe_attempts: u32,
    pub probe_successes: u32,
    /// Time since the last recorded failure.
    pub since_last_failure: Option<Duration>,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    probe_attempts: u32,
    probe_successes: u32,
}

/// Failure-isolation gate. The state machine itself does no I/O; see
/// [`CircuitBreaker::call`] for the guarded-call helper.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                probe_attempts: 0,
                probe_successes: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask permission for one call.
    ///
    /// An open circuit whose timeout has elapsed moves to half-open and
    /// admits this call as its first probe.
    pub fn can_make_request(&self) -> bool {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map_or(Duration::MAX, |at| now.duration_since(at));
                if elapsed >= self.config.open_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_attempts = 1;
                    inner.probe_successes = 0;
                    tracing::info!("Catalog circuit half-open, probing");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_attempts < self.config.half_open_probes {
                    inner.probe_attempts += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.probe_successes += 1;
                if inner.probe_successes >= self.config.half_open_probes {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.probe_attempts = 0;
                    inner.probe_successes = 0;
                    tracing::info!("Catalog circuit closed");
                }
            }
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self, error: &CatalogError) {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.failure_count += 1;
        inner.last_failure = Some(now);

        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.probe_attempts = 0;
                inner.probe_successes = 0;
                tracing::warn!(error = %error, "Catalog probe failed, circuit reopened");
            }
            CircuitState::Closed if inner.failure_count >= self.config.failure_threshold => {
                inner.state = CircuitState::Open;
                tracing::warn!(
                    failures = inner.failure_count,
                    error = %error,
                    "Catalog circuit opened"
                );
            }
            _ => {
                tracing::debug!(failures = inner.failure_count, error = %error, "Catalog call failed");
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = self.clock.now();
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            probe_attempts: inner.probe_attempts,
            probe_successes: inner.probe_successes,
            since_last_failure: inner.last_failure.map(|at| now.duration_since(at)),
        }
    }

    /// Run a catalog call through the breaker with a deadline.
    ///
    /// Rejected calls return [`CatalogError::CircuitOpen`] without polling
    /// `call`. A missed deadline drops the call and counts as a failure, as
    /// do transient errors. Other errors mean the catalog answered and count
    /// as success.
    pub async fn call<T, F>(&self, deadline: Duration, call: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>>,
    {
        if !self.can_make_request() {
            return Err(CatalogError::CircuitOpen);
        }

        let outcome = match tokio::time::timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Timeout {
                elapsed_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        match &outcome {
            Err(e) if e.is_transient() => self.record_failure(e),
            _ => self.record_success(),
        }
        outcome
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn breaker() -> (Arc<ManualClock>, CircuitBreaker) {
        let clock = Arc::new(ManualClock::new());
        (
            clock.clone(),
            CircuitBreaker::new(CircuitBreakerConfig::default(), clock),
        )
    }

    fn net() -> CatalogError {
        CatalogError::Network {
            message: "connection reset".to_string(),
        }
    }

    #[test]
    fn test_opens_after_threshold_and_recovers_after_timeout() {
        let (clock, breaker) = breaker();
        breaker.record_failure(&net());
        breaker.record_failure(&net());
        assert!(breaker.can_make_request());

        breaker.record_failure(&net());
        assert!(!breaker.can_make_request());
        assert_eq!(breaker.state(), CircuitState::Open);

        clock.advance(Duration::from_secs(59));
        assert!(!breaker.can_make_request());

        clock.advance(Duration::from_secs(1));
        assert!(breaker.can_make_request());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_success_resets_failures_while_closed() {
        let (_clock, breaker) = breaker();
        breaker.record_failure(&net());
        breaker.record_failure(&net());
        breaker.record_success();
        breaker.record_failure(&net());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().failure_count, 1);
    }

    #[test]
    fn test_half_open_limits_probes_and_closes_after_successes() {
        let (clock, breaker) = breaker();
        for _ in 0..3 {
            breaker.record_failure(&net());
        }
        clock.advance(Duration::from_secs(60));

        assert!(breaker.can_make_request()); // transition, probe 1
        assert!(breaker.can_make_request()); // probe 2
        assert!(!breaker.can_make_request());

        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().failure_count, 0);
    }

    #[test]
    fn test_failure_while_half_open_reopens_immediately() {
        let (clock, breaker) = breaker();
        for _ in 0..3 {
            breaker.record_failure(&net());
        }
        clock.advance(Duration::from_secs(60));
        assert!(breaker.can_make_request());
        breaker.record_success();

        breaker.record_failure(&net());

        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.can_make_request());
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.probe_attempts, 0);
        assert_eq!(snapshot.probe_successes, 0);
    }

    #[tokio::test]
    async fn test_call_rejects_when_open() {
        let (_clock, breaker) = breaker();
        for _ in 0..3 {
            breaker.record_failure(&net());
        }
        let result = breaker.call(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result, Err(CatalogError::CircuitOpen));
    }

    #[tokio::test]
    async fn test_non_transient_errors_do_not_count() {
        let (_clock, breaker) = breaker();
        for _ in 0..5 {
            let _ = breaker
                .call::<(), _>(Duration::from_secs(1), async {
                    Err(CatalogError::NotFound { id: 1 })
                })
                .await;
        }
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_counts_as_failure() {
        let (_clock, breaker) = breaker();
        let result = breaker
            .call(Duration::from_secs(1), async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(1)
            })
            .await;
        assert_eq!(result, Err(CatalogError::Timeout { elapsed_ms: 1000 }));
        assert_eq!(breaker.snapshot().failure_count, 1);
    }
}
