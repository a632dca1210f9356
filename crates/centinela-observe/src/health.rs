//! Sliding-window health monitoring.
//!
//! # Toyota Way: Genchi Genbutsu (現地現物)
//! Judge health from what actually happened: the latencies and error flags
//! of the most recent completed calls, nothing else.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use centinela_core::HealthThresholds;
use centinela_core::config::humantime_serde;
use serde::{Deserialize, Serialize};

/// One completed call, as seen by the monitor.
#[derive(Debug, Clone, Copy)]
pub struct HealthSample {
    /// Wall-clock duration of the call.
    pub response_time: Duration,
    /// Whether the call ended in an error.
    pub is_error: bool,
}

/// Aggregate metrics over the current window.
///
/// With zero samples the window is vacuously healthy: zero average, zero
/// error rate. This is deliberate: a cold-started guardian admits traffic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Mean response time across the window.
    #[serde(with = "humantime_serde")]
    pub avg_response_time: Duration,
    /// Fraction of windowed calls that errored (0.0 to 1.0).
    pub error_rate: f64,
    /// Number of samples currently in the window.
    pub total_requests: usize,
    /// Advisory flag: both thresholds satisfied.
    pub healthy: bool,
}

impl HealthMetrics {
    /// Metrics of an empty window.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            avg_response_time: Duration::ZERO,
            error_rate: 0.0,
            total_requests: 0,
            healthy: true,
        }
    }
}

/// Fixed-capacity sliding window over recent call outcomes.
///
/// The window holds at most `window_size` samples; recording evicts the
/// oldest once full. The `healthy` flag uses the advisory
/// [`HealthThresholds`]; the decision loop applies its own, stricter
/// bounds on the same aggregates.
pub struct HealthMonitor {
    window_size: usize,
    thresholds: HealthThresholds,
    samples: Mutex<VecDeque<HealthSample>>,
}

impl HealthMonitor {
    /// Creates a monitor with the given window size and thresholds.
    #[must_use]
    pub fn new(window_size: usize, thresholds: HealthThresholds) -> Self {
        Self {
            window_size,
            thresholds,
            samples: Mutex::new(VecDeque::with_capacity(window_size)),
        }
    }

    /// Returns the configured window size.
    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns the advisory thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// Records a completed call, evicting the oldest sample when full.
    pub fn record_request(&self, response_time: Duration, is_error: bool) {
        let mut samples = self
            .samples
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if samples.len() == self.window_size {
            samples.pop_front();
        }
        samples.push_back(HealthSample {
            response_time,
            is_error,
        });
    }

    /// Returns aggregate metrics over the current window.
    #[must_use]
    pub fn metrics(&self) -> HealthMetrics {
        let samples = self
            .samples
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if samples.is_empty() {
            return HealthMetrics::empty();
        }

        let total = samples.len();
        let sum: Duration = samples.iter().map(|s| s.response_time).sum();
        let errors = samples.iter().filter(|s| s.is_error).count();

        let avg_response_time = sum / total as u32;
        let error_rate = errors as f64 / total as f64;
        let healthy = avg_response_time < self.thresholds.max_avg_response
            && error_rate < self.thresholds.max_error_rate;

        HealthMetrics {
            avg_response_time,
            error_rate,
            total_requests: total,
            healthy,
        }
    }

    /// Returns the number of samples currently in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns true if no samples have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
