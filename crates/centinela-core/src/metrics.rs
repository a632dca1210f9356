//! Guardian metrics following the RED method (Rate, Errors, Duration).
//!
//! # Toyota Way: Visual Management (目で見る管理)
//! Make admission behavior visible at a glance: how much traffic was
//! admitted, how much was refused, and why.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Admission counters for one guardian instance.
///
/// Thread-safe and cheaply cloneable; clones share the same counters.
#[derive(Debug, Clone)]
pub struct GuardianMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    admitted_total: AtomicU64,
    rejected_rate_limited: AtomicU64,
    rejected_circuit_open: AtomicU64,
    rejected_degraded: AtomicU64,
    operation_errors: AtomicU64,
    breaker_trips: AtomicU64,
    recoveries: AtomicU64,
    start_time: Instant,
}

impl GuardianMetrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                admitted_total: AtomicU64::new(0),
                rejected_rate_limited: AtomicU64::new(0),
                rejected_circuit_open: AtomicU64::new(0),
                rejected_degraded: AtomicU64::new(0),
                operation_errors: AtomicU64::new(0),
                breaker_trips: AtomicU64::new(0),
                recoveries: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }

    /// Records an admitted call.
    pub fn record_admitted(&self) {
        self.inner.admitted_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rejection caused by the rate limiter.
    pub fn record_rate_limited(&self) {
        self.inner
            .rejected_rate_limited
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rejection caused by an open breaker.
    pub fn record_circuit_open(&self) {
        self.inner
            .rejected_circuit_open
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rejection caused by degraded mode.
    pub fn record_degraded(&self) {
        self.inner.rejected_degraded.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a protected operation that was attempted and failed.
    pub fn record_operation_error(&self) {
        self.inner.operation_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a breaker trip forced by the decision loop.
    pub fn record_trip(&self) {
        self.inner.breaker_trips.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a return to normal operation.
    pub fn record_recovery(&self) {
        self.inner.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total admitted calls.
    #[must_use]
    pub fn admitted_total(&self) -> u64 {
        self.inner.admitted_total.load(Ordering::Relaxed)
    }

    /// Returns total rejections across all causes.
    #[must_use]
    pub fn rejected_total(&self) -> u64 {
        self.inner.rejected_rate_limited.load(Ordering::Relaxed)
            + self.inner.rejected_circuit_open.load(Ordering::Relaxed)
            + self.inner.rejected_degraded.load(Ordering::Relaxed)
    }

    /// Returns total operation failures.
    #[must_use]
    pub fn operation_errors(&self) -> u64 {
        self.inner.operation_errors.load(Ordering::Relaxed)
    }

    /// Returns total loop-forced breaker trips.
    #[must_use]
    pub fn breaker_trips(&self) -> u64 {
        self.inner.breaker_trips.load(Ordering::Relaxed)
    }

    /// Returns total recoveries to normal operation.
    #[must_use]
    pub fn recoveries(&self) -> u64 {
        self.inner.recoveries.load(Ordering::Relaxed)
    }

    /// Returns guardian uptime.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.start_time.elapsed()
    }

    /// Creates a snapshot of current counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            admitted_total: self.admitted_total(),
            rejected_rate_limited: self.inner.rejected_rate_limited.load(Ordering::Relaxed),
            rejected_circuit_open: self.inner.rejected_circuit_open.load(Ordering::Relaxed),
            rejected_degraded: self.inner.rejected_degraded.load(Ordering::Relaxed),
            operation_errors: self.operation_errors(),
            breaker_trips: self.breaker_trips(),
            recoveries: self.recoveries(),
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

impl Default for GuardianMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of guardian counters at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total admitted calls.
    pub admitted_total: u64,
    /// Rejections caused by the rate limiter.
    pub rejected_rate_limited: u64,
    /// Rejections caused by an open breaker.
    pub rejected_circuit_open: u64,
    /// Rejections caused by degraded mode.
    pub rejected_degraded: u64,
    /// Protected operations that were attempted and failed.
    pub operation_errors: u64,
    /// Breaker trips forced by the decision loop.
    pub breaker_trips: u64,
    /// Returns to normal operation.
    pub recoveries: u64,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}
