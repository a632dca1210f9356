// Examples are allowed to use expect/unwrap for simplicity
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Centinela Guardian Example
//!
//! Drives a guardian through burst exhaustion, a circuit breaker trip
//! from consecutive backend failures, and recovery after the cooldown.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example guardian
//!
//! # With per-cycle decision logging
//! RUST_LOG=debug cargo run --example guardian
//! ```

use std::time::Duration;

use centinela::prelude::*;
use centinela_policy::BoxError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Thresholds are relaxed so the breaker opens through its own failure
    // threshold; a loop-forced trip also disables normal operation until
    // an operator steps in, which makes a poor demo.
    let config = GuardianConfig::new()
        .with_rate(5.0, 5)
        .with_failure_threshold(3)
        .with_recovery_timeout(Duration::from_secs(2))
        .with_window_size(10)
        .with_health_thresholds(HealthThresholds::new(Duration::from_secs(5), 0.9))
        .with_trip_thresholds(TripThresholds::new(0.9, Duration::from_secs(10)));
    let guardian = Guardian::new(config).expect("valid config");

    // Phase 1: burn through the burst.
    tracing::info!("phase 1: burst traffic");
    for i in 1..=7 {
        let admitted = guardian.check_admission();
        tracing::info!(call = i, admitted, "admission check");
    }

    // Phase 2: wait for refill, then feed a failing backend until the
    // breaker opens.
    tracing::info!("phase 2: failing backend");
    std::thread::sleep(Duration::from_millis(1200));
    for i in 1..=4 {
        let result =
            guardian.admit_with(|| Err::<(), BoxError>(format!("backend timeout #{i}").into()));
        match result {
            Ok(()) => tracing::info!(call = i, "failing call unexpectedly succeeded"),
            Err(e) => tracing::info!(call = i, error = %e, "failing call refused or failed"),
        }
    }

    let status = guardian.status();
    tracing::info!(
        circuit = ?status.observations.circuit_state,
        decision = %status.decision,
        "after failures"
    );

    // Phase 3: recovery after the breaker cooldown.
    tracing::info!("phase 3: recovery");
    std::thread::sleep(Duration::from_millis(2200));
    let recovered = guardian.admit_with(|| Ok::<_, BoxError>(()));
    tracing::info!(recovered = recovered.is_ok(), "recovery trial");

    let status_json =
        serde_json::to_string_pretty(&guardian.status()).expect("status serializes");
    println!("final status:\n{status_json}");

    let metrics_json =
        serde_json::to_string_pretty(&guardian.metrics().snapshot()).expect("metrics serialize");
    println!("counters:\n{metrics_json}");
}
