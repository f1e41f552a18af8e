//! Failure isolation and request coalescing for remote calls.

mod circuit_breaker;
mod inflight;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState};
pub use inflight::InFlight;
