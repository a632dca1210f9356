// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # centinela-guardian
//!
//! The Centinela admission guardian: an Observe-Orient-Decide-Act loop
//! that gates every unit of work behind a token bucket, a circuit
//! breaker, and a sliding-window health monitor.
//!
//! ## Iron Lotus Framework
//!
//! - **Jidoka** (自働化): Stop admitting work when the system degrades
//! - **Genchi Genbutsu** (現地現物): Decisions come from observed outcomes
//!
//! ## Example
//!
//! ```rust,ignore
//! use centinela_core::GuardianConfig;
//! use centinela_guardian::Guardian;
//!
//! let guardian = Guardian::new(GuardianConfig::default())?;
//!
//! if guardian.check_admission() {
//!     // proceed with the unit of work
//! }
//!
//! let result = guardian.admit_with(|| fetch_quote());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod guardian;
pub mod status;

pub use error::{GuardianError, Result};
pub use guardian::Guardian;
pub use status::{Analysis, GuardianStatus, Observations};
