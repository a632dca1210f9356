//! Guardian configuration types.
//!
//! Per Iron Lotus Framework: Configuration is validated at load time
//! (Poka-Yoke), with sensible defaults and clear error messages.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Guardian configuration.
///
/// # Toyota Way: Standardized Work (標準作業)
/// Every guardian follows the same configuration contract: construct once,
/// validate, never mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianConfig {
    /// Token bucket refill rate (requests per second).
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Token bucket capacity (maximum burst).
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Consecutive failures before the breaker opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Cooldown before an open breaker allows a recovery trial.
    #[serde(default = "default_recovery_timeout")]
    #[serde(with = "humantime_serde")]
    pub recovery_timeout: Duration,

    /// Number of recent samples retained by the health monitor.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Advisory thresholds applied by the health monitor.
    #[serde(default)]
    pub health: HealthThresholds,

    /// Action thresholds applied by the decision loop.
    #[serde(default)]
    pub trip: TripThresholds,
}

fn default_requests_per_second() -> f64 {
    10.0
}

fn default_burst_size() -> u32 {
    20
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_recovery_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_window_size() -> usize {
    100
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            failure_threshold: default_failure_threshold(),
            recovery_timeout: default_recovery_timeout(),
            window_size: default_window_size(),
            health: HealthThresholds::default(),
            trip: TripThresholds::default(),
        }
    }
}

impl GuardianConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the refill rate and burst capacity.
    #[must_use]
    pub const fn with_rate(mut self, requests_per_second: f64, burst_size: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self.burst_size = burst_size;
        self
    }

    /// Sets the breaker failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the breaker recovery timeout.
    #[must_use]
    pub const fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }

    /// Sets the health window size.
    #[must_use]
    pub const fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Sets the advisory health thresholds.
    #[must_use]
    pub const fn with_health_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.health = thresholds;
        self
    }

    /// Sets the decision-loop trip thresholds.
    #[must_use]
    pub const fn with_trip_thresholds(mut self, thresholds: TripThresholds) -> Self {
        self.trip = thresholds;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.requests_per_second.is_finite() || self.requests_per_second <= 0.0 {
            return Err(CoreError::config(
                "requests_per_second must be positive and finite",
            ));
        }
        if self.burst_size == 0 {
            return Err(CoreError::config("burst_size must be greater than 0"));
        }
        if self.failure_threshold == 0 {
            return Err(CoreError::config(
                "failure_threshold must be greater than 0",
            ));
        }
        if self.recovery_timeout.is_zero() {
            return Err(CoreError::config("recovery_timeout must be non-zero"));
        }
        if self.window_size == 0 {
            return Err(CoreError::config("window_size must be greater than 0"));
        }
        self.health.validate()?;
        self.trip.validate()?;
        Ok(())
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoreError::config(format!("failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CoreError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Advisory thresholds for the health monitor's `healthy` flag.
///
/// These are looser than [`TripThresholds`]: breaching them marks the
/// system degraded, breaching the trip thresholds forces the breaker open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Average response time above which the window is unhealthy.
    #[serde(default = "default_health_avg_response")]
    #[serde(with = "humantime_serde")]
    pub max_avg_response: Duration,

    /// Error rate (0.0 to 1.0) at or above which the window is unhealthy.
    #[serde(default = "default_health_error_rate")]
    pub max_error_rate: f64,
}

fn default_health_avg_response() -> Duration {
    Duration::from_secs(5)
}

fn default_health_error_rate() -> f64 {
    0.10
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            max_avg_response: default_health_avg_response(),
            max_error_rate: default_health_error_rate(),
        }
    }
}

impl HealthThresholds {
    /// Creates thresholds from explicit values.
    #[must_use]
    pub const fn new(max_avg_response: Duration, max_error_rate: f64) -> Self {
        Self {
            max_avg_response,
            max_error_rate,
        }
    }

    /// Validates the thresholds.
    ///
    /// # Errors
    /// Returns an error if a threshold is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.max_avg_response.is_zero() {
            return Err(CoreError::config("health.max_avg_response must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.max_error_rate) || self.max_error_rate == 0.0 {
            return Err(CoreError::config(
                "health.max_error_rate must be within (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Action thresholds for the decision loop.
///
/// Strictly worse conditions than [`HealthThresholds`]: crossing either
/// bound makes the loop trip the breaker rather than merely degrade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TripThresholds {
    /// Error rate (0.0 to 1.0) above which the loop trips the breaker.
    #[serde(default = "default_trip_error_rate")]
    pub max_error_rate: f64,

    /// Average response time above which the loop trips the breaker.
    #[serde(default = "default_trip_avg_response")]
    #[serde(with = "humantime_serde")]
    pub max_avg_response: Duration,
}

fn default_trip_error_rate() -> f64 {
    0.20
}

fn default_trip_avg_response() -> Duration {
    Duration::from_secs(10)
}

impl Default for TripThresholds {
    fn default() -> Self {
        Self {
            max_error_rate: default_trip_error_rate(),
            max_avg_response: default_trip_avg_response(),
        }
    }
}

impl TripThresholds {
    /// Creates thresholds from explicit values.
    #[must_use]
    pub const fn new(max_error_rate: f64, max_avg_response: Duration) -> Self {
        Self {
            max_error_rate,
            max_avg_response,
        }
    }

    /// Validates the thresholds.
    ///
    /// # Errors
    /// Returns an error if a threshold is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_error_rate) || self.max_error_rate == 0.0 {
            return Err(CoreError::config("trip.max_error_rate must be within (0, 1]"));
        }
        if self.max_avg_response.is_zero() {
            return Err(CoreError::config("trip.max_avg_response must be non-zero"));
        }
        Ok(())
    }
}

/// Serde helper for humantime durations.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes a duration as a human-readable string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    /// Deserializes a duration from a human-readable string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
