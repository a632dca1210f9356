// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # centinela-observe
//!
//! Health observation for the Centinela guardian.
//!
//! This crate provides the sliding-window [`HealthMonitor`]: a
//! fixed-capacity record of recent request latencies and error flags,
//! aggregated into [`HealthMetrics`] for the decision loop.
//!
//! ## Iron Lotus Framework
//!
//! - **Genchi Genbutsu** (現地現物): Direct observation of completed calls
//! - **Visual Management** (目で見る管理): Aggregate health at a glance

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod health;

pub use health::{HealthMetrics, HealthMonitor, HealthSample};
