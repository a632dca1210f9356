//! The OODA admission loop.
//!
//! # Toyota Way: Jidoka (自働化)
//! Stop the line when quality degrades: every admission call runs one
//! Observe-Orient-Decide-Act cycle before the gate is applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use centinela_core::{CoreError, GuardianConfig, GuardianDecision, GuardianId, GuardianMetrics};
use centinela_observe::HealthMonitor;
use centinela_policy::{BoxError, CircuitBreaker, CircuitState, PolicyError, TokenBucket};

use crate::error::{GuardianError, Result};
use crate::status::{Analysis, GuardianStatus, Observations};

/// Admission guardian composing a token bucket, a circuit breaker, and a
/// sliding-window health monitor inside an OODA decision cycle.
///
/// One `Guardian` is shared (via `Arc`) by every caller of the process;
/// nothing is partitioned per caller. Each leaf guards its own state with
/// its own lock or atomic, so a cycle reads individually-consistent values
/// but the ensemble may be stale by the time Act mutates state. That
/// staleness window is accepted: no lock spans the whole cycle, and
/// unrelated traffic is never serialized behind it.
///
/// State is in-memory only and resets with the process.
pub struct Guardian {
    id: GuardianId,
    config: GuardianConfig,
    limiter: TokenBucket,
    breaker: CircuitBreaker,
    monitor: HealthMonitor,
    operational: AtomicBool,
    metrics: GuardianMetrics,
}

impl Guardian {
    /// Creates a guardian from a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: GuardianConfig) -> std::result::Result<Self, CoreError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Creates a guardian with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_config(GuardianConfig::default())
    }

    fn from_config(config: GuardianConfig) -> Self {
        let guardian = Self {
            id: GuardianId::new(),
            limiter: TokenBucket::new(config.requests_per_second, config.burst_size),
            breaker: CircuitBreaker::new(config.failure_threshold, config.recovery_timeout),
            monitor: HealthMonitor::new(config.window_size, config.health),
            operational: AtomicBool::new(true),
            metrics: GuardianMetrics::new(),
            config,
        };

        tracing::info!(
            id = %guardian.id,
            rate = guardian.config.requests_per_second,
            burst = guardian.config.burst_size,
            failure_threshold = guardian.config.failure_threshold,
            "guardian initialized"
        );
        guardian
    }

    /// Returns the guardian ID.
    #[must_use]
    pub const fn id(&self) -> GuardianId {
        self.id
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardianConfig {
        &self.config
    }

    /// Returns the admission counters.
    #[must_use]
    pub const fn metrics(&self) -> &GuardianMetrics {
        &self.metrics
    }

    /// Runs one admission check with no protected operation.
    ///
    /// Boolean gate: `false` means rate limited, circuit open, or degraded
    /// mode; callers that need the cause should use
    /// [`admit_with`](Self::admit_with) or [`status`](Self::status). An
    /// admitted no-op still contributes a success sample to the health
    /// window; the breaker is not probed.
    pub fn check_admission(&self) -> bool {
        self.run_cycle();
        if self.gate().is_err() {
            return false;
        }

        let start = Instant::now();
        self.monitor.record_request(start.elapsed(), false);
        self.metrics.record_admitted();
        true
    }

    /// Runs one admission check and, if admitted, executes the operation
    /// through the circuit breaker.
    ///
    /// The operation's wall-clock duration and error flag feed the health
    /// window whenever the operation was actually attempted. Rejections
    /// (`RateLimited`, `CircuitOpen`, `Degraded`) leave the window
    /// untouched. `admit_with(op).is_ok()` is the boolean form of this
    /// gate.
    ///
    /// # Errors
    /// Returns a rejection variant when the gate refuses the call, or
    /// [`GuardianError::Operation`] when the operation ran and failed.
    pub fn admit_with<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, BoxError>,
    {
        self.run_cycle();
        self.gate()?;

        let start = Instant::now();
        match self.breaker.execute(operation) {
            Ok(value) => {
                self.monitor.record_request(start.elapsed(), false);
                self.metrics.record_admitted();
                Ok(value)
            }
            // Lost a half-open trial race: nothing was attempted, no sample.
            Err(PolicyError::CircuitOpen) => {
                self.metrics.record_circuit_open();
                Err(GuardianError::CircuitOpen)
            }
            Err(PolicyError::Operation(source)) => {
                self.monitor.record_request(start.elapsed(), true);
                self.metrics.record_admitted();
                self.metrics.record_operation_error();
                tracing::warn!(id = %self.id, error = %source, "protected operation failed");
                Err(GuardianError::Operation(source))
            }
        }
    }

    /// Returns a read-only status snapshot.
    ///
    /// Runs Observe, Orient, and Decide but never Act: no token is
    /// consumed, no breaker transition happens, the operational flag is
    /// untouched.
    #[must_use]
    pub fn status(&self) -> GuardianStatus {
        let observations = self.observe();
        let analysis = self.orient(&observations);
        let decision = Self::decide(&analysis);

        GuardianStatus {
            operational: observations.operational,
            observations,
            analysis,
            decision,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OODA phases
    // ═══════════════════════════════════════════════════════════════════════

    fn run_cycle(&self) -> GuardianDecision {
        let observations = self.observe();
        let analysis = self.orient(&observations);
        let decision = Self::decide(&analysis);

        tracing::debug!(id = %self.id, decision = %decision, "admission cycle");
        self.act(decision);
        decision
    }

    fn observe(&self) -> Observations {
        Observations {
            health: self.monitor.metrics(),
            circuit_state: self.breaker.state(),
            limiter_tokens: self.limiter.available(),
            operational: self.operational.load(Ordering::Relaxed),
        }
    }

    fn orient(&self, observations: &Observations) -> Analysis {
        Analysis {
            system_healthy: observations.health.healthy,
            high_error_rate: observations.health.error_rate > self.config.trip.max_error_rate,
            slow_responses: observations.health.avg_response_time
                > self.config.trip.max_avg_response,
            circuit_open: observations.circuit_state == CircuitState::Open,
            rate_limited: observations.limiter_tokens < 1.0,
        }
    }

    fn decide(analysis: &Analysis) -> GuardianDecision {
        if analysis.circuit_open {
            GuardianDecision::MaintainCircuitOpen
        } else if analysis.high_error_rate || analysis.slow_responses {
            GuardianDecision::TripCircuitBreaker
        } else if !analysis.system_healthy {
            GuardianDecision::EnableDegradedMode
        } else {
            GuardianDecision::NormalOperation
        }
    }

    fn act(&self, decision: GuardianDecision) {
        match decision {
            GuardianDecision::TripCircuitBreaker => {
                self.breaker.trip();
                self.metrics.record_trip();
                if self.operational.swap(false, Ordering::Relaxed) {
                    tracing::warn!(id = %self.id, "tripping circuit breaker, leaving normal operation");
                }
            }
            GuardianDecision::EnableDegradedMode => {
                if self.operational.swap(false, Ordering::Relaxed) {
                    tracing::warn!(id = %self.id, "entering degraded mode");
                }
            }
            GuardianDecision::NormalOperation => {
                if !self.operational.swap(true, Ordering::Relaxed) {
                    self.metrics.record_recovery();
                    tracing::info!(id = %self.id, "normal operation restored");
                }
            }
            // The breaker's own timeout governs recovery.
            GuardianDecision::MaintainCircuitOpen => {}
        }
    }

    /// Applies the admission gate: limiter, breaker, operational flag.
    fn gate(&self) -> Result<()> {
        if !self.limiter.allow_request() {
            self.metrics.record_rate_limited();
            tracing::warn!(id = %self.id, "request rate limited");
            return Err(GuardianError::RateLimited);
        }

        // An open breaker whose recovery timeout has elapsed is admittable;
        // the half-open trial itself is claimed inside `execute`.
        if !self.breaker.allow() {
            self.metrics.record_circuit_open();
            tracing::warn!(id = %self.id, "circuit breaker open, rejecting request");
            return Err(GuardianError::CircuitOpen);
        }

        if !self.operational.load(Ordering::Relaxed) {
            self.metrics.record_degraded();
            tracing::warn!(id = %self.id, "degraded mode, rejecting request");
            return Err(GuardianError::Degraded);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use centinela_core::{HealthThresholds, TripThresholds};
    use std::time::Duration;

    /// High rate and burst so limiter behavior does not interfere.
    fn unthrottled() -> GuardianConfig {
        GuardianConfig::new().with_rate(10_000.0, 1_000)
    }

    fn failing() -> std::result::Result<(), BoxError> {
        Err("induced failure".into())
    }

    #[test]
    fn test_guardian_rejects_invalid_config() {
        let config = GuardianConfig::new().with_rate(0.0, 10);
        assert!(Guardian::new(config).is_err());
    }

    #[test]
    fn test_cold_start_admits() {
        let guardian = Guardian::with_defaults();
        assert!(guardian.check_admission());

        let status = guardian.status();
        assert!(status.operational);
        assert!(status.analysis.system_healthy);
        assert_eq!(status.decision, GuardianDecision::NormalOperation);
    }

    #[test]
    fn test_rate_limit_rejects_past_burst() {
        // Slow refill so no token accrues mid-test.
        let config = GuardianConfig::new().with_rate(1.0, 2);
        let guardian = Guardian::new(config).unwrap();

        assert!(guardian.check_admission());
        assert!(guardian.check_admission());
        assert!(!guardian.check_admission());

        let status = guardian.status();
        assert!(status.analysis.rate_limited);
        assert_eq!(guardian.metrics().snapshot().rejected_rate_limited, 1);
    }

    #[test]
    fn test_admit_with_returns_operation_value() {
        let guardian = Guardian::new(unthrottled()).unwrap();
        let value = guardian.admit_with(|| Ok::<_, BoxError>(7)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(guardian.metrics().admitted_total(), 1);
    }

    #[test]
    fn test_admit_with_surfaces_operation_error() {
        let guardian = Guardian::new(unthrottled()).unwrap();

        let result = guardian.admit_with(|| failing());
        assert!(matches!(result, Err(GuardianError::Operation(_))));
        assert_eq!(guardian.metrics().operation_errors(), 1);

        // The failure landed in the health window.
        let status = guardian.status();
        assert!(status.observations.health.error_rate > 0.0);
    }

    #[test]
    fn test_high_error_rate_trips_breaker() {
        // Lenient advisory thresholds so degraded mode never preempts the trip.
        let config = unthrottled()
            .with_window_size(10)
            .with_health_thresholds(HealthThresholds::new(Duration::from_secs(5), 0.9))
            .with_trip_thresholds(TripThresholds::new(0.3, Duration::from_secs(10)));
        let guardian = Guardian::new(config).unwrap();

        assert!(guardian.admit_with(|| Ok::<_, BoxError>(())).is_ok());
        let _ = guardian.admit_with(|| failing());

        // Error rate is now 1/2; the next cycle trips the breaker and the
        // call is rejected before its operation runs.
        let result = guardian.admit_with(|| Ok::<_, BoxError>(()));
        assert!(matches!(result, Err(GuardianError::CircuitOpen)));

        let status = guardian.status();
        assert_eq!(status.observations.circuit_state, CircuitState::Open);
        assert_eq!(status.decision, GuardianDecision::MaintainCircuitOpen);
        assert!(!status.operational);
        assert!(guardian.metrics().breaker_trips() >= 1);
    }

    #[test]
    fn test_slow_responses_trip_breaker() {
        let config = unthrottled()
            .with_window_size(10)
            .with_health_thresholds(HealthThresholds::new(Duration::from_secs(5), 0.9))
            .with_trip_thresholds(TripThresholds::new(0.9, Duration::from_millis(10)));
        let guardian = Guardian::new(config).unwrap();

        let slow = guardian.admit_with(|| {
            std::thread::sleep(Duration::from_millis(40));
            Ok::<_, BoxError>(())
        });
        assert!(slow.is_ok());

        let result = guardian.admit_with(|| Ok::<_, BoxError>(()));
        assert!(matches!(result, Err(GuardianError::CircuitOpen)));
        assert_eq!(
            guardian.status().observations.circuit_state,
            CircuitState::Open
        );
    }

    #[test]
    fn test_degraded_mode_rejects_without_touching_breaker() {
        // Advisory threshold breached at 0.5 error rate, trip threshold not.
        let config = unthrottled()
            .with_window_size(4)
            .with_health_thresholds(HealthThresholds::new(Duration::from_secs(5), 0.4))
            .with_trip_thresholds(TripThresholds::new(0.8, Duration::from_secs(10)));
        let guardian = Guardian::new(config).unwrap();

        assert!(guardian.admit_with(|| Ok::<_, BoxError>(())).is_ok());
        let _ = guardian.admit_with(|| failing());

        let result = guardian.admit_with(|| Ok::<_, BoxError>(()));
        assert!(matches!(result, Err(GuardianError::Degraded)));

        let status = guardian.status();
        assert_eq!(status.observations.circuit_state, CircuitState::Closed);
        assert_eq!(status.decision, GuardianDecision::EnableDegradedMode);
        assert!(!status.operational);
        assert_eq!(guardian.metrics().snapshot().rejected_degraded, 1);
    }

    #[test]
    fn test_status_is_side_effect_free() {
        let config = GuardianConfig::new().with_rate(10.0, 5);
        let guardian = Guardian::new(config).unwrap();

        let before = guardian.status();
        for _ in 0..10 {
            let _ = guardian.status();
        }
        let after = guardian.status();

        // No tokens consumed, no state transitions, no samples recorded.
        assert!(after.observations.limiter_tokens >= before.observations.limiter_tokens - 0.01);
        assert_eq!(after.observations.circuit_state, CircuitState::Closed);
        assert_eq!(after.observations.health.total_requests, 0);
        assert!(after.operational);
    }

    #[test]
    fn test_status_serializes_for_dashboards() {
        let guardian = Guardian::with_defaults();
        let json = serde_json::to_string(&guardian.status()).unwrap();
        assert!(json.contains("\"decision\":\"normal-operation\""));
        assert!(json.contains("\"circuit_state\":\"closed\""));
    }

    #[test]
    fn test_breaker_recovers_through_guardian() {
        let config = unthrottled()
            .with_window_size(4)
            .with_failure_threshold(2)
            .with_recovery_timeout(Duration::from_millis(300))
            // Keep the loop out of the way: only the breaker's own
            // threshold path is exercised here.
            .with_health_thresholds(HealthThresholds::new(Duration::from_secs(5), 0.99))
            .with_trip_thresholds(TripThresholds::new(0.99, Duration::from_secs(10)));
        let guardian = Guardian::new(config).unwrap();

        // Successes first so the windowed error rate stays below the
        // (deliberately lenient) loop thresholds throughout.
        assert!(guardian.admit_with(|| Ok::<_, BoxError>(())).is_ok());
        assert!(guardian.admit_with(|| Ok::<_, BoxError>(())).is_ok());

        let _ = guardian.admit_with(|| failing());
        let _ = guardian.admit_with(|| failing());
        assert_eq!(
            guardian.status().observations.circuit_state,
            CircuitState::Open
        );

        // Inside the cooldown the gate rejects.
        assert!(matches!(
            guardian.admit_with(|| Ok::<_, BoxError>(())),
            Err(GuardianError::CircuitOpen)
        ));

        std::thread::sleep(Duration::from_millis(400));

        // The half-open trial runs through the gate and closes the circuit.
        assert!(guardian.admit_with(|| Ok::<_, BoxError>(())).is_ok());
        assert_eq!(
            guardian.status().observations.circuit_state,
            CircuitState::Closed
        );
    }

    #[test]
    fn test_guardian_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Guardian>();
    }
}
