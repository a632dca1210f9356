//! Token bucket rate limiting.
//!
//! # Toyota Way: Heijunka (平準化)
//! Level the incoming load: credits accrue at a fixed rate, bursts are
//! bounded by bucket capacity.

use std::sync::Mutex;
use std::time::Instant;

/// Token bucket rate limiter.
///
/// Credits refill continuously based on elapsed time, capped at the burst
/// capacity; each admitted request consumes one credit. The limiter never
/// blocks; callers that are refused must re-poll later.
pub struct TokenBucket {
    /// Refill rate in tokens per second.
    rate: f64,
    /// Maximum token count (burst capacity).
    capacity: f64,
    /// Mutable bucket state.
    inner: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Creates a full bucket.
    ///
    /// # Arguments
    /// * `requests_per_second` - Refill rate
    /// * `burst_size` - Maximum burst capacity
    #[must_use]
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        Self {
            rate: requests_per_second,
            capacity: f64::from(burst_size),
            inner: Mutex::new(BucketState {
                tokens: f64::from(burst_size),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Consumes one token if available.
    ///
    /// Refills by `elapsed × rate` (clamped to capacity) before consuming,
    /// so token count stays within `[0, capacity]`.
    pub fn allow_request(&self) -> bool {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Returns the current token count including accrued refill.
    ///
    /// Pure projection: the bucket is not mutated, so status snapshots
    /// remain side-effect free.
    #[must_use]
    pub fn available(&self) -> f64 {
        let state = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let elapsed = state.last_refill.elapsed().as_secs_f64();
        (state.tokens + elapsed * self.rate).min(self.capacity)
    }

    /// Returns the burst capacity.
    #[must_use]
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Returns the refill rate in tokens per second.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }
}
