//! Core types for the admission guardian.
//!
//! Per Iron Lotus Framework: UUIDs for stable IDs, explicit state machines,
//! no implicit transitions.

use serde::{Deserialize, Serialize};

/// Unique identifier for a guardian instance.
///
/// A process may run several guardians (one per protected resource); the
/// ID ties log lines and metrics back to the instance that emitted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardianId(uuid::Uuid);

impl GuardianId {
    /// Creates a new random guardian ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a guardian ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for GuardianId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GuardianId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one Observe-Orient-Decide-Act cycle.
///
/// Decision priority is strict, first match wins:
/// ```text
/// circuit open          → MaintainCircuitOpen
/// errors or slowness    → TripCircuitBreaker
/// advisory unhealthy    → EnableDegradedMode
/// otherwise             → NormalOperation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardianDecision {
    /// Breaker is already open; its own timeout governs recovery.
    MaintainCircuitOpen,
    /// Force the breaker open and leave normal operation.
    TripCircuitBreaker,
    /// Advisory health breached; stop admitting without touching the breaker.
    EnableDegradedMode,
    /// All clear; admit traffic.
    NormalOperation,
}

impl GuardianDecision {
    /// Returns true if the decision curtails traffic in any way.
    #[must_use]
    pub const fn is_protective(&self) -> bool {
        !matches!(self, Self::NormalOperation)
    }
}

impl std::fmt::Display for GuardianDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MaintainCircuitOpen => "maintain-circuit-open",
            Self::TripCircuitBreaker => "trip-circuit-breaker",
            Self::EnableDegradedMode => "enable-degraded-mode",
            Self::NormalOperation => "normal-operation",
        };
        f.write_str(s)
    }
}
