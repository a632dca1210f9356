// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # centinela-core
//!
//! Core primitives for the Centinela admission guardian.
//!
//! This crate provides the foundational pieces shared by the policy,
//! observation, and guardian crates:
//!
//! - [`GuardianConfig`] for guardian configuration
//! - [`GuardianDecision`] and [`GuardianId`] core types
//! - [`GuardianMetrics`] for RED method counters (Rate, Errors, Duration)
//!
//! ## Iron Lotus Framework
//!
//! - **Poka-Yoke** (ポカヨケ): Configuration validated at load time
//! - **Jidoka** (自働化): Explicit error handling, no panics
//! - **Visual Management** (目で見る管理): Metrics snapshots for dashboards

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::{GuardianConfig, HealthThresholds, TripThresholds};
pub use error::{CoreError, Result};
pub use metrics::{GuardianMetrics, MetricsSnapshot};
pub use types::{GuardianDecision, GuardianId};
