//! Chaos injection for resilience testing.
//!
//! # Reference
//! Netflix. (2012). Chaos Monkey. GitHub.
//! <https://github.com/Netflix/chaosmonkey>

use std::time::Duration;

use centinela_policy::BoxError;

/// Chaos injection configuration.
#[derive(Debug, Clone, Default)]
pub struct ChaosConfig {
    /// Error injection probability (0.0 to 1.0).
    pub error_injection: Option<f64>,
    /// Latency injection: (probability, delay).
    pub latency_injection: Option<(f64, Duration)>,
}

impl ChaosConfig {
    /// Creates a config with error injection only.
    #[must_use]
    pub fn errors(probability: f64) -> Self {
        Self {
            error_injection: Some(probability),
            ..Default::default()
        }
    }

    /// Creates a config with latency injection only.
    #[must_use]
    pub fn latency(probability: f64, delay: Duration) -> Self {
        Self {
            latency_injection: Some((probability, delay)),
            ..Default::default()
        }
    }

    /// Creates a config combining error and latency injection.
    #[must_use]
    pub fn flaky(error_probability: f64, latency_probability: f64, delay: Duration) -> Self {
        Self {
            error_injection: Some(error_probability),
            latency_injection: Some((latency_probability, delay)),
        }
    }
}

/// Chaos injector standing in for a protected operation.
///
/// Each [`operation`](Self::operation) call optionally sleeps and
/// optionally fails, per the configured probabilities. Inactive injectors
/// always succeed immediately, so a test can toggle chaos mid-run.
pub struct ChaosInjector {
    config: ChaosConfig,
    active: bool,
}

impl ChaosInjector {
    /// Creates a new chaos injector (inactive until started).
    #[must_use]
    pub const fn new(config: ChaosConfig) -> Self {
        Self {
            config,
            active: false,
        }
    }

    /// Starts chaos injection.
    pub fn start(&mut self) {
        tracing::warn!("starting chaos injection: {:?}", self.config);
        self.active = true;
    }

    /// Stops chaos injection.
    pub fn stop(&mut self) {
        tracing::info!("stopping chaos injection");
        self.active = false;
    }

    /// Returns true if chaos injection is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the chaos config.
    #[must_use]
    pub const fn config(&self) -> &ChaosConfig {
        &self.config
    }

    /// Injects latency if configured and active.
    pub fn maybe_inject_latency(&self) {
        if !self.active {
            return;
        }

        if let Some((probability, delay)) = self.config.latency_injection
            && rand_probability(probability)
        {
            tracing::debug!("injecting latency: {delay:?}");
            std::thread::sleep(delay);
        }
    }

    /// Returns true if an error should be injected.
    #[must_use]
    pub fn should_inject_error(&self) -> bool {
        if !self.active {
            return false;
        }

        if let Some(probability) = self.config.error_injection
            && rand_probability(probability)
        {
            tracing::debug!("injecting error");
            return true;
        }

        false
    }

    /// Runs one chaotic operation: latency first, then the error roll.
    ///
    /// # Errors
    /// Returns an injected error per the configured probability.
    pub fn operation(&self) -> std::result::Result<(), BoxError> {
        self.maybe_inject_latency();
        if self.should_inject_error() {
            return Err("injected failure".into());
        }
        Ok(())
    }
}

/// Simple probability check (not cryptographically secure).
fn rand_probability(p: f64) -> bool {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();

    (f64::from(nanos) / f64::from(u32::MAX)) < p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaos_config_default() {
        let config = ChaosConfig::default();
        assert!(config.error_injection.is_none());
        assert!(config.latency_injection.is_none());
    }

    #[test]
    fn test_chaos_config_constructors() {
        let config = ChaosConfig::errors(0.05);
        assert!(config.error_injection.is_some());
        assert!(config.latency_injection.is_none());

        let config = ChaosConfig::latency(0.1, Duration::from_millis(100));
        let (prob, delay) = config.latency_injection.expect("latency");
        assert!((prob - 0.1).abs() < 0.001);
        assert_eq!(delay, Duration::from_millis(100));

        let config = ChaosConfig::flaky(0.05, 0.1, Duration::from_millis(50));
        assert!(config.error_injection.is_some());
        assert!(config.latency_injection.is_some());
    }

    #[test]
    fn test_injector_lifecycle() {
        let mut injector = ChaosInjector::new(ChaosConfig::default());
        assert!(!injector.is_active());

        injector.start();
        assert!(injector.is_active());

        injector.stop();
        assert!(!injector.is_active());
    }

    #[test]
    fn test_inactive_injector_never_fails() {
        let injector = ChaosInjector::new(ChaosConfig::errors(1.0));
        for _ in 0..10 {
            assert!(injector.operation().is_ok());
            assert!(!injector.should_inject_error());
        }
    }

    #[test]
    fn test_certain_error_injection() {
        let mut injector = ChaosInjector::new(ChaosConfig::errors(1.0));
        injector.start();
        assert!(injector.operation().is_err());
    }

    #[test]
    fn test_zero_probability_never_injects() {
        let mut injector = ChaosInjector::new(ChaosConfig::errors(0.0));
        injector.start();
        for _ in 0..10 {
            assert!(injector.operation().is_ok());
        }
    }

    #[test]
    fn test_certain_latency_injection() {
        let mut injector = ChaosInjector::new(ChaosConfig::latency(1.0, Duration::from_millis(50)));
        injector.start();

        let start = std::time::Instant::now();
        injector.maybe_inject_latency();
        assert!(start.elapsed() >= Duration::from_millis(45));
    }
}
