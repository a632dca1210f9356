//! Test infrastructure error types.

/// Result type alias for test infrastructure operations.
pub type Result<T> = std::result::Result<T, TestError>;

/// Test infrastructure errors.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Load test worker failed.
    #[error("load test error: {0}")]
    Load(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TestError {
    /// Creates a load test error.
    #[must_use]
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = TestError::load("worker panicked");
        assert!(err.to_string().contains("load test error"));
        assert!(err.to_string().contains("worker panicked"));
    }
}
