//! Centinela: Operational Resilience Guardian
//!
//! Part of the PAIML Sovereign AI Stack.
//!
//! Centinela gates every unit of work behind an Observe-Orient-Decide-Act
//! loop composed of a token-bucket rate limiter, a circuit breaker, and a
//! sliding-window health monitor.
//!
//! # Quick Start
//!
//! ```rust
//! use centinela::prelude::*;
//!
//! let guardian = Guardian::new(GuardianConfig::default()).expect("valid defaults");
//!
//! if guardian.check_admission() {
//!     // proceed with the unit of work
//! }
//! ```

pub use centinela_core as core;
pub use centinela_guardian as guardian;
pub use centinela_observe as observe;
pub use centinela_policy as policy;

/// Prelude module for common imports.
pub mod prelude {
    pub use centinela_core::{
        GuardianConfig, GuardianDecision, GuardianId, GuardianMetrics, HealthThresholds,
        MetricsSnapshot, TripThresholds,
    };
    pub use centinela_guardian::{Guardian, GuardianError, GuardianStatus};
    pub use centinela_observe::{HealthMetrics, HealthMonitor};
    pub use centinela_policy::{CircuitBreaker, CircuitState, TokenBucket};
}
