//! Policy error types.

/// Boxed error produced by a protected operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors produced by the circuit breaker.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Circuit breaker rejected the call without attempting the operation.
    #[error("circuit breaker open")]
    CircuitOpen,

    /// The protected operation itself failed.
    #[error("operation failed: {0}")]
    Operation(#[source] BoxError),
}

impl PolicyError {
    /// Creates an operation failure from any error.
    #[must_use]
    pub fn operation(err: impl Into<BoxError>) -> Self {
        Self::Operation(err.into())
    }

    /// Returns true if the call was rejected without being attempted.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::CircuitOpen)
    }
}
