//! Circuit breaker guarding the upstream registry
//!
//! Stops hammering a failing upstream: after a run of consecutive failures
//! the circuit opens and fetches are refused for a cooldown window, then a
//! single probe call is allowed through. The probe's outcome decides whether
//! the circuit closes again or reopens.
//!
//! Created once at process start and shared by every fetch path; all state
//! transitions are atomic with respect to concurrent callers.

use std::sync::Mutex;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::BreakerConfig;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - all calls pass through.
    Closed,
    /// Failing fast - calls are rejected until the cooldown elapses.
    Open,
    /// Testing recovery - one probe call is allowed.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Thread-safe circuit breaker.
///
/// A mutex (not atomics) keeps the half-open single-probe rule exact: only
/// the first `can_execute` after the cooldown wins the probe slot.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker in the `Closed` state.
    pub fn new(config: BreakerConfig) -> Self {
        CircuitBreaker {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Whether a call should be attempted right now.
    ///
    /// In `Open`, returns false until the cooldown elapses, then transitions
    /// to `HalfOpen` and grants exactly one probe; further calls see false
    /// until the probe resolves via `record_success`/`record_failure`.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed() >= self.config.cooldown)
                    .unwrap_or(true);
                if elapsed {
                    info!(event = "breaker.half_open", "Cooldown elapsed, allowing one probe");
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    false
                } else {
                    inner.probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a successful call - closes the circuit and resets the counter.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != CircuitState::Closed {
            info!(event = "breaker.closed", "Upstream recovered, circuit closed");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.probe_in_flight = false;
    }

    /// Record a failed call - may open (or reopen) the circuit.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        inner.probe_in_flight = false;
        match inner.state {
            CircuitState::HalfOpen => {
                warn!(event = "breaker.reopened", "Probe failed, circuit reopened");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
            }
            CircuitState::Closed if inner.consecutive_failures >= self.config.failure_threshold => {
                warn!(
                    event = "breaker.opened",
                    failures = inner.consecutive_failures,
                    "Failure threshold reached, circuit opened"
                );
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
            }
            _ => {}
        }
    }

    /// Current state, for status reporting.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    /// Number of consecutive failures recorded so far.
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().unwrap().consecutive_failures
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}
