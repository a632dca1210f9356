//! Read-only status snapshots for reporting.
//!
//! These types are what `Guardian::status` hands to dashboards and
//! operators: enough detail to tell *why* admission is being refused.

use centinela_core::GuardianDecision;
use centinela_observe::HealthMetrics;
use centinela_policy::CircuitState;
use serde::{Deserialize, Serialize};

/// Raw state gathered by the Observe phase.
///
/// Each field is individually consistent at read time; the ensemble is a
/// best-effort snapshot, not a transaction across the three leaves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Observations {
    /// Aggregate metrics from the health window.
    pub health: HealthMetrics,
    /// Current circuit breaker state.
    pub circuit_state: CircuitState,
    /// Tokens currently available in the rate limiter.
    pub limiter_tokens: f64,
    /// Whether the guardian is in normal operation.
    pub operational: bool,
}

/// Condition flags derived by the Orient phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Analysis {
    /// Advisory health flag from the monitor.
    pub system_healthy: bool,
    /// Windowed error rate exceeds the trip threshold.
    pub high_error_rate: bool,
    /// Windowed average latency exceeds the trip threshold.
    pub slow_responses: bool,
    /// The breaker is currently open.
    pub circuit_open: bool,
    /// Fewer than one token is available.
    pub rate_limited: bool,
}

/// Point-in-time guardian status for external reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardianStatus {
    /// What the guardian observed.
    pub observations: Observations,
    /// What it derived from the observations.
    pub analysis: Analysis,
    /// What a cycle run now would decide.
    pub decision: GuardianDecision,
    /// Whether the guardian is in normal operation.
    pub operational: bool,
}
