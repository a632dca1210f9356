// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # centinela-test
//!
//! Testing infrastructure for the Centinela guardian.
//!
//! This crate provides:
//! - **Chaos injection**: probabilistic error and latency injection for
//!   protected operations
//! - **Load testing**: concurrent admission traffic against a shared
//!   guardian
//! - **Falsification tests**: Popperian tests for the guardian's
//!   admission properties (`tests/falsification.rs`)
//!
//! ## Iron Lotus Framework
//!
//! - **Built-in Quality** (品質の作り込み): Quality cannot be inspected in
//! - **Popperian Falsification**: Tests designed to refute claims
//!
//! ## Example
//!
//! ```rust,ignore
//! use centinela_test::{AdmissionLoadTester, ChaosConfig, ChaosInjector, LoadTestConfig};
//!
//! let mut chaos = ChaosInjector::new(ChaosConfig::errors(0.05));
//! chaos.start();
//!
//! let report = AdmissionLoadTester::new(LoadTestConfig::quick())
//!     .with_chaos(chaos)
//!     .run(guardian)
//!     .await?;
//! assert!(report.admitted > 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chaos;
pub mod error;
pub mod load;

pub use chaos::{ChaosConfig, ChaosInjector};
pub use error::{Result, TestError};
pub use load::{AdmissionLoadTester, AdmissionReport, LoadTestConfig};
