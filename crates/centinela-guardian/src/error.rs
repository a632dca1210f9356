//! Guardian error types.
//!
//! The first three variants are rejections: the guardian refused the call
//! without attempting it. Only [`GuardianError::Operation`] means the
//! protected operation actually ran and failed.

use centinela_policy::{BoxError, PolicyError};

/// Result type alias for guardian operations.
pub type Result<T> = std::result::Result<T, GuardianError>;

/// Reasons an admission call did not complete successfully.
#[derive(Debug, thiserror::Error)]
pub enum GuardianError {
    /// Token bucket empty.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Circuit breaker rejected the call without attempting the operation.
    #[error("circuit breaker open")]
    CircuitOpen,

    /// Guardian decided the system is unhealthy though the breaker is closed.
    #[error("guardian in degraded mode")]
    Degraded,

    /// The protected operation itself failed.
    #[error("operation failed: {0}")]
    Operation(#[source] BoxError),
}

impl GuardianError {
    /// Returns true if the call was refused without being attempted.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::RateLimited | Self::CircuitOpen | Self::Degraded)
    }
}

impl From<PolicyError> for GuardianError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::CircuitOpen => Self::CircuitOpen,
            PolicyError::Operation(source) => Self::Operation(source),
        }
    }
}
