// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # centinela-policy
//!
//! Admission policy leaves for the Centinela guardian.
//!
//! This crate provides:
//! - **Token bucket**: continuous-refill rate limiting
//! - **Circuit breaker**: 3-state failure protection with single-trial recovery
//!
//! ## Iron Lotus Framework
//!
//! - **Jidoka** (自働化): Automatic stop when the failure threshold is reached
//! - **Heijunka** (平準化): Level traffic via token-bucket pacing
//!
//! ## Example
//!
//! ```rust,ignore
//! use centinela_policy::{CircuitBreaker, TokenBucket};
//!
//! let limiter = TokenBucket::new(10.0, 20);
//! let breaker = CircuitBreaker::new(5, Duration::from_secs(30));
//!
//! if limiter.allow_request() {
//!     let result = breaker.execute(|| do_work());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod circuit_breaker;
pub mod error;
pub mod limiter;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use error::{BoxError, PolicyError, Result};
pub use limiter::TokenBucket;
