//! Concurrent admission load testing.
//!
//! # Toyota Way: Heijunka (平準化)
//! Drive level, concurrent traffic through a shared guardian to understand
//! how the gate behaves at capacity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use centinela_guardian::{Guardian, GuardianError};

use crate::chaos::ChaosInjector;
use crate::error::{Result, TestError};

/// Load test configuration.
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    /// Number of concurrent callers.
    pub concurrent_callers: u32,
    /// Admission attempts per caller.
    pub requests_per_caller: u32,
    /// Optional delay between a caller's attempts.
    pub pacing: Option<Duration>,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            concurrent_callers: 10,
            requests_per_caller: 100,
            pacing: None,
        }
    }
}

impl LoadTestConfig {
    /// Creates a quick config for tests (small volumes).
    #[must_use]
    pub const fn quick() -> Self {
        Self {
            concurrent_callers: 4,
            requests_per_caller: 10,
            pacing: None,
        }
    }

    /// Creates a moderate config.
    #[must_use]
    pub const fn moderate() -> Self {
        Self {
            concurrent_callers: 50,
            requests_per_caller: 200,
            pacing: Some(Duration::from_millis(5)),
        }
    }
}

/// Shared counters for concurrent load test workers.
#[derive(Default)]
struct LoadCounters {
    admitted: AtomicU64,
    rejected: AtomicU64,
    operation_errors: AtomicU64,
    latencies_us: Mutex<Vec<u64>>,
}

impl LoadCounters {
    fn record(&self, outcome: &std::result::Result<(), GuardianError>, latency_us: u64) {
        match outcome {
            Ok(()) => {
                self.admitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) if err.is_rejection() => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.operation_errors.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(mut latencies) = self.latencies_us.lock() {
            latencies.push(latency_us);
        }
    }
}

/// Drives concurrent admission traffic against a shared guardian.
pub struct AdmissionLoadTester {
    config: LoadTestConfig,
    chaos: Option<Arc<ChaosInjector>>,
}

impl AdmissionLoadTester {
    /// Creates a new load tester.
    #[must_use]
    pub const fn new(config: LoadTestConfig) -> Self {
        Self {
            config,
            chaos: None,
        }
    }

    /// Routes each admitted call through a chaos injector.
    ///
    /// Without chaos, workers issue plain `check_admission` calls.
    #[must_use]
    pub fn with_chaos(mut self, chaos: ChaosInjector) -> Self {
        self.chaos = Some(Arc::new(chaos));
        self
    }

    /// Returns the test config.
    #[must_use]
    pub const fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Runs the load test with concurrent workers.
    ///
    /// # Errors
    /// Returns an error if a worker task fails to complete.
    pub async fn run(&self, guardian: Arc<Guardian>) -> Result<AdmissionReport> {
        tracing::info!(
            callers = self.config.concurrent_callers,
            requests = self.config.requests_per_caller,
            "starting admission load test"
        );

        let counters = Arc::new(LoadCounters::default());
        let start_time = Instant::now();

        let mut handles = Vec::with_capacity(self.config.concurrent_callers as usize);
        for _ in 0..self.config.concurrent_callers {
            let guardian = Arc::clone(&guardian);
            let counters = Arc::clone(&counters);
            let chaos = self.chaos.clone();
            let requests = self.config.requests_per_caller;
            let pacing = self.config.pacing;

            handles.push(tokio::spawn(async move {
                for _ in 0..requests {
                    let attempt_start = Instant::now();
                    let outcome = match &chaos {
                        Some(injector) => guardian.admit_with(|| injector.operation()),
                        None => {
                            if guardian.check_admission() {
                                Ok(())
                            } else {
                                Err(GuardianError::RateLimited)
                            }
                        }
                    };
                    let latency_us = attempt_start.elapsed().as_micros() as u64;
                    counters.record(&outcome, latency_us);

                    if let Some(delay) = pacing {
                        tokio::time::sleep(delay).await;
                    }
                }
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| TestError::load(format!("worker failed: {e}")))?;
        }

        let elapsed = start_time.elapsed();
        let report = Self::build_report(&counters, elapsed);

        tracing::info!(
            total = report.total,
            admitted = report.admitted,
            rejected = report.rejected,
            operation_errors = report.operation_errors,
            p99_us = report.latency_p99_us,
            "admission load test completed"
        );

        Ok(report)
    }

    fn build_report(counters: &LoadCounters, elapsed: Duration) -> AdmissionReport {
        let admitted = counters.admitted.load(Ordering::Relaxed);
        let rejected = counters.rejected.load(Ordering::Relaxed);
        let operation_errors = counters.operation_errors.load(Ordering::Relaxed);
        let total = admitted + rejected + operation_errors;

        let mut latencies = counters
            .latencies_us
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default();
        latencies.sort_unstable();

        let throughput_rps = if elapsed.as_secs_f64() > 0.0 {
            total as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        AdmissionReport {
            total,
            admitted,
            rejected,
            operation_errors,
            latency_p50_us: percentile(&latencies, 50),
            latency_p95_us: percentile(&latencies, 95),
            latency_p99_us: percentile(&latencies, 99),
            throughput_rps,
        }
    }
}

impl Default for AdmissionLoadTester {
    fn default() -> Self {
        Self::new(LoadTestConfig::default())
    }
}

/// Aggregate result of an admission load test.
#[derive(Debug, Clone)]
pub struct AdmissionReport {
    /// Total admission attempts.
    pub total: u64,
    /// Attempts that were admitted (and whose operation succeeded).
    pub admitted: u64,
    /// Attempts refused by the gate.
    pub rejected: u64,
    /// Attempts admitted whose operation failed.
    pub operation_errors: u64,
    /// Median admission latency in microseconds.
    pub latency_p50_us: u64,
    /// 95th percentile admission latency in microseconds.
    pub latency_p95_us: u64,
    /// 99th percentile admission latency in microseconds.
    pub latency_p99_us: u64,
    /// Attempts per second over the whole run.
    pub throughput_rps: f64,
}

impl AdmissionReport {
    /// Returns the fraction of attempts that were admitted.
    #[must_use]
    pub fn admit_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.admitted + self.operation_errors) as f64 / self.total as f64
        }
    }
}

/// Computes a percentile from a sorted slice.
fn percentile(sorted: &[u64], p: usize) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (p * sorted.len()).div_ceil(100);
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}
