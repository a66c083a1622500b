use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::metrics::{
    record_circuit_breaker_state, record_circuit_breaker_transition,
    CircuitBreakerState as MetricsState,
};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitBreakerState::Closed => "closed",
            CircuitBreakerState::Open => "open",
            CircuitBreakerState::HalfOpen => "half_open",
        }
    }
}

impl From<CircuitBreakerState> for MetricsState {
    fn from(state: CircuitBreakerState) -> Self {
        match state {
            CircuitBreakerState::Closed => MetricsState::Closed,
            CircuitBreakerState::Open => MetricsState::Open,
            CircuitBreakerState::HalfOpen => MetricsState::HalfOpen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    /// Deadline applied to every guarded call
    pub timeout: Duration,
    /// How long the circuit stays open before a trial call is let through
    pub half_open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(10),
            half_open_timeout: Duration::from_secs(30),
        }
    }
}

/// Circuit breaker guarding calls to one remote dependency
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    epoch: Instant,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    // Millis since `epoch` of the most recent failure
    last_failure_ms: AtomicU64,
    state: RwLock<CircuitBreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        record_circuit_breaker_state(&name, MetricsState::Closed);

        Self {
            name,
            config,
            epoch: Instant::now(),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure_ms: AtomicU64::new(0),
            state: RwLock::new(CircuitBreakerState::Closed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Test helper: every error counts as a failure
    #[cfg(test)]
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.call_classified(f, |_| true).await
    }

    /// Execute a future with circuit breaker protection. Errors for which
    /// `is_failure` returns false are passed through without tripping the
    /// breaker (a 404 from a healthy service, for example).
    pub async fn call_classified<F, T, E, C>(
        &self,
        f: F,
        is_failure: C,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
    {
        if !self.check_state().await {
            tracing::debug!(service = %self.name, "Circuit breaker rejected call");
            return Err(CircuitBreakerError::Open);
        }

        let start = Instant::now();
        match tokio::time::timeout(self.config.timeout, f).await {
            Ok(Ok(value)) => {
                self.on_success().await;
                tracing::debug!(
                    service = %self.name,
                    duration_ms = %start.elapsed().as_millis(),
                    "Circuit breaker call succeeded"
                );
                Ok(value)
            }
            Ok(Err(err)) => {
                if is_failure(&err) {
                    self.on_failure().await;
                    tracing::warn!(
                        service = %self.name,
                        duration_ms = %start.elapsed().as_millis(),
                        "Circuit breaker call failed"
                    );
                } else {
                    self.on_success().await;
                }
                Err(CircuitBreakerError::CallFailed(err))
            }
            Err(_) => {
                self.on_failure().await;
                tracing::error!(
                    service = %self.name,
                    timeout_ms = %self.config.timeout.as_millis(),
                    "Circuit breaker call timed out"
                );
                Err(CircuitBreakerError::Timeout)
            }
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn transition(&self, state: &mut CircuitBreakerState, to: CircuitBreakerState) {
        let from = *state;
        *state = to;
        record_circuit_breaker_transition(&self.name, from.into(), to.into());
        record_circuit_breaker_state(&self.name, to.into());
        tracing::info!(service = %self.name, from = ?from, to = ?to, "Circuit breaker transitioned");
    }

    /// Returns true if the call should proceed, false if the circuit is open
    async fn check_state(&self) -> bool {
        let mut state = self.state.write().await;

        match *state {
            CircuitBreakerState::Closed | CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => {
                let since_failure = self
                    .now_ms()
                    .saturating_sub(self.last_failure_ms.load(Ordering::Relaxed));

                if since_failure >= self.config.half_open_timeout.as_millis() as u64 {
                    self.success_count.store(0, Ordering::Relaxed);
                    self.transition(&mut state, CircuitBreakerState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    async fn on_success(&self) {
        let mut state = self.state.write().await;

        match *state {
            CircuitBreakerState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitBreakerState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
                if successes >= self.config.success_threshold {
                    self.failure_count.store(0, Ordering::Relaxed);
                    self.success_count.store(0, Ordering::Relaxed);
                    self.transition(&mut state, CircuitBreakerState::Closed);
                }
            }
            CircuitBreakerState::Open => {}
        }
    }

    async fn on_failure(&self) {
        let mut state = self.state.write().await;
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_failure_ms.store(self.now_ms(), Ordering::Relaxed);

        match *state {
            CircuitBreakerState::Closed => {
                if failures >= self.config.failure_threshold {
                    tracing::warn!(service = %self.name, failures = %failures, "Circuit breaker opened");
                    self.transition(&mut state, CircuitBreakerState::Open);
                }
            }
            CircuitBreakerState::HalfOpen => {
                // Any failure while probing reopens the circuit
                self.failure_count.store(1, Ordering::Relaxed);
                self.transition(&mut state, CircuitBreakerState::Open);
            }
            CircuitBreakerState::Open => {}
        }
    }

    /// Current state, reported by the health endpoint
    pub async fn get_state(&self) -> CircuitBreakerState {
        *self.state.read().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("Circuit breaker is open")]
    Open,

    #[error("Call timed out")]
    Timeout,

    #[error("Call failed: {0}")]
    CallFailed(E),
}
