//! Error types for centinela-core.
//!
//! Per Iron Lotus Framework: All errors are explicit, no panics allowed.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing or loading guardian primitives.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration error during guardian initialization.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
