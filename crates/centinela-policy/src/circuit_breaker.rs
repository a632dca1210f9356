//! Circuit breaker pattern implementation.
//!
//! # Reference
//! Fowler, M. (2014). Circuit Breaker pattern. martinfowler.com.
//!
//! # Toyota Way: Jidoka (自働化)
//! Automatic stop when failure threshold reached.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::error::{BoxError, PolicyError, Result};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Circuit is closed (operations run normally).
    Closed,
    /// Circuit is open (operations rejected until the recovery timeout).
    Open,
    /// Circuit is half-open (a single recovery trial is in flight).
    HalfOpen,
}

/// Circuit breaker for failure protection.
///
/// Implements the three-state circuit breaker pattern:
/// - **Closed**: Normal operation, calls pass through
/// - **Open**: Failure threshold exceeded, calls rejected
/// - **Half-Open**: Exactly one trial tests whether the fault has cleared
///
/// State reads (`state`, `allow`, `failure_count`) never transition the
/// machine; transitions happen only inside [`execute`](Self::execute) and
/// [`trip`](Self::trip), which keeps status snapshots side-effect free.
pub struct CircuitBreaker {
    /// Current state.
    state: RwLock<CircuitState>,
    /// Failure threshold before opening.
    failure_threshold: u32,
    /// Current consecutive failure count.
    failure_count: AtomicU32,
    /// Cooldown before an open circuit allows a recovery trial.
    recovery_timeout: Duration,
    /// Time of the most recent failure (or forced trip).
    last_failure: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker.
    ///
    /// # Arguments
    /// * `failure_threshold` - Number of failures before opening the circuit
    /// * `recovery_timeout` - Time to wait before testing recovery
    #[must_use]
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_threshold,
            failure_count: AtomicU32::new(0),
            recovery_timeout,
            last_failure: RwLock::new(None),
        }
    }

    /// Returns the current circuit state.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        *self
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns true if a call issued now would be attempted.
    ///
    /// Open circuits become admittable once the recovery timeout elapses;
    /// the transition itself is deferred to `execute` so that the trial is
    /// claimed by exactly one caller.
    #[must_use]
    pub fn allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => false,
            CircuitState::Open => self.recovery_elapsed(),
        }
    }

    /// Returns the current failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Returns the configured failure threshold.
    #[must_use]
    pub const fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Returns the configured recovery timeout.
    #[must_use]
    pub const fn recovery_timeout(&self) -> Duration {
        self.recovery_timeout
    }

    /// Executes an operation through the breaker.
    ///
    /// Any `Err` from the operation counts as a failure and is wrapped as
    /// [`PolicyError::Operation`]; any `Ok` is a success regardless of
    /// value. While the circuit is open, calls are rejected with
    /// [`PolicyError::CircuitOpen`] until the recovery timeout elapses, at
    /// which point the caller that wins the Open→HalfOpen transition runs a
    /// single trial and everyone else keeps getting `CircuitOpen`.
    ///
    /// # Errors
    /// Returns `CircuitOpen` when rejected, `Operation` when the wrapped
    /// operation fails.
    pub fn execute<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, BoxError>,
    {
        match self.state() {
            CircuitState::Closed => self.attempt(operation),
            // A trial is already in flight; single-trial semantics.
            CircuitState::HalfOpen => Err(PolicyError::CircuitOpen),
            CircuitState::Open => {
                if !self.recovery_elapsed() {
                    return Err(PolicyError::CircuitOpen);
                }

                {
                    let mut state = self
                        .state
                        .write()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    if *state != CircuitState::Open {
                        // Lost the race for the trial slot.
                        return Err(PolicyError::CircuitOpen);
                    }
                    *state = CircuitState::HalfOpen;
                }

                tracing::info!("circuit breaker half-open, testing recovery");
                self.attempt(operation)
            }
        }
    }

    /// Forces the circuit open.
    ///
    /// Raises the failure count to at least the threshold and stamps the
    /// failure time, so a forced trip recovers through the same timeout
    /// path as a threshold trip.
    pub fn trip(&self) {
        self.failure_count
            .fetch_max(self.failure_threshold, Ordering::Relaxed);

        {
            let mut last = self
                .last_failure
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *last = Some(Instant::now());
        }

        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *state = CircuitState::Open;
        }

        tracing::warn!("circuit breaker tripped open");
    }

    /// Runs the operation and applies the outcome to the state machine.
    fn attempt<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, BoxError>,
    {
        match operation() {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(PolicyError::Operation(err))
            }
        }
    }

    fn on_success(&self) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match *state {
            CircuitState::HalfOpen => {
                *state = CircuitState::Closed;
                drop(state);
                self.failure_count.store(0, Ordering::Relaxed);
                tracing::info!("circuit breaker closed after successful trial");
            }
            CircuitState::Closed => {
                drop(state);
                self.failure_count.store(0, Ordering::Relaxed);
            }
            // Forced open while the call was in flight; the trip stands.
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self) {
        {
            let mut last = self
                .last_failure
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *last = Some(Instant::now());
        }

        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match *state {
            CircuitState::Closed => {
                let count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
                if count >= self.failure_threshold {
                    *state = CircuitState::Open;
                    drop(state);
                    tracing::warn!(failures = count, "circuit breaker opened");
                }
            }
            CircuitState::HalfOpen => {
                // Failure count stays at or above the threshold.
                *state = CircuitState::Open;
                drop(state);
                tracing::warn!("circuit breaker reopened after failed trial");
            }
            CircuitState::Open => {}
        }
    }

    fn recovery_elapsed(&self) -> bool {
        self.last_failure
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .map_or(true, |t| t.elapsed() >= self.recovery_timeout)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    fn failing() -> std::result::Result<(), BoxError> {
        Err("induced failure".into())
    }

    #[test]
    fn test_breaker_closed_by_default() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.allow());
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_breaker_opens_at_threshold() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));

        for _ in 0..4 {
            assert!(breaker.execute(|| failing()).is_err());
        }
        assert_eq!(breaker.state(), CircuitState::Closed);

        assert!(breaker.execute(|| failing()).is_err());
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.allow());
    }

    #[test]
    fn test_open_breaker_rejects_without_invoking() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));
        for _ in 0..5 {
            let _ = breaker.execute(|| failing());
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        let invocations = AtomicU64::new(0);
        let result = breaker.execute(|| {
            invocations.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BoxError>(())
        });

        assert!(matches!(result, Err(PolicyError::CircuitOpen)));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_success_resets_count_when_closed() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));

        let _ = breaker.execute(|| failing());
        let _ = breaker.execute(|| failing());
        assert_eq!(breaker.failure_count(), 2);

        assert!(breaker.execute(|| Ok::<_, BoxError>(42)).is_ok());
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_breaker_recovers_after_timeout() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(300));
        let _ = breaker.execute(|| failing());
        let _ = breaker.execute(|| failing());
        assert_eq!(breaker.state(), CircuitState::Open);

        // Still inside the cooldown: rejected.
        assert!(matches!(
            breaker.execute(|| Ok::<_, BoxError>(())),
            Err(PolicyError::CircuitOpen)
        ));

        std::thread::sleep(Duration::from_millis(400));
        assert!(breaker.allow());

        assert!(breaker.execute(|| Ok::<_, BoxError>(())).is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_failed_trial_reopens_and_restarts_timer() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(300));
        let _ = breaker.execute(|| failing());
        let _ = breaker.execute(|| failing());
        assert_eq!(breaker.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(400));
        assert!(matches!(
            breaker.execute(|| failing()),
            Err(PolicyError::Operation(_))
        ));
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.failure_count() >= breaker.failure_threshold());

        // Timer restarted from the trial failure: immediately rejected again.
        assert!(matches!(
            breaker.execute(|| Ok::<_, BoxError>(())),
            Err(PolicyError::CircuitOpen)
        ));

        std::thread::sleep(Duration::from_millis(400));
        assert!(breaker.execute(|| Ok::<_, BoxError>(())).is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_single_trial_rejects_concurrent_calls() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(50));
        let _ = breaker.execute(|| failing());
        assert_eq!(breaker.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(80));

        // While the trial runs, any other call observes HalfOpen and is
        // rejected.
        let outer = breaker.execute(|| {
            assert!(matches!(
                breaker.execute(|| Ok::<_, BoxError>(())),
                Err(PolicyError::CircuitOpen)
            ));
            Ok::<_, BoxError>(())
        });

        assert!(outer.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_trip_forces_open() {
        let breaker = CircuitBreaker::new(5, Duration::from_millis(300));
        assert_eq!(breaker.state(), CircuitState::Closed);

        breaker.trip();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.failure_count() >= 5);
        assert!(!breaker.allow());

        // Forced trips recover through the same timeout path.
        std::thread::sleep(Duration::from_millis(400));
        assert!(breaker.allow());
        assert!(breaker.execute(|| Ok::<_, BoxError>(())).is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_open_state_serializes_kebab_case() {
        let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
        assert_eq!(json, "\"half-open\"");
    }
}
