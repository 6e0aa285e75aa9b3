//! Client-side request throttling
//!
//! Every request an [`HttpClient`](super::HttpClient) sends, retries
//! included, draws one permit from a shared governor token bucket.

use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Request budget, as written under `rate_limit:` in the client config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests that may go out back to back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// The governor quota; zero values are clamped to one
    pub fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket; clones draw from the same budget
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DefaultDirectRateLimiter>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(governor::RateLimiter::direct(config.quota())),
            config: config.clone(),
        }
    }

    /// Take a permit, waiting for one if the budget is spent
    ///
    /// Returns `true` when the caller was throttled.
    pub async fn acquire(&self) -> bool {
        if self.bucket.check().is_ok() {
            return false;
        }
        debug!(
            requests_per_second = self.config.requests_per_second,
            burst_size = self.config.burst_size,
            "Request budget spent, throttling"
        );
        self.bucket.until_ready().await;
        true
    }

    /// Take a permit only if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

impl From<&RateLimiterConfig> for RateLimiter {
    fn from(config: &RateLimiterConfig) -> Self {
        Self::new(config)
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_config_from_yaml() {
        let config: RateLimiterConfig =
            serde_yaml::from_str("requests_per_second: 5\nburst_size: 2\n").unwrap();
        assert_eq!(config, RateLimiterConfig::new(5, 2));
        assert_eq!(RateLimiterConfig::default(), RateLimiterConfig::new(10, 10));
    }

    #[test]
    fn test_quota_clamps_zero() {
        let quota = RateLimiterConfig::new(0, 0).quota();
        assert_eq!(quota.burst_size(), NonZeroU32::MIN);
    }

    #[test]
    fn test_burst_then_exhausted() {
        let limiter = RateLimiter::from(&RateLimiterConfig::new(1, 3));

        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_clones_share_budget() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 1));
        let other = limiter.clone();

        assert!(limiter.try_acquire());
        assert!(!other.try_acquire());
    }

    #[test]
    fn test_acquire_within_burst_does_not_throttle() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(100, 10));
        assert!(!tokio_test::block_on(limiter.acquire()));
    }

    #[tokio::test]
    async fn test_acquire_waits_when_budget_spent() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(50, 1));
        assert!(!limiter.acquire().await);

        let started = Instant::now();
        assert!(limiter.acquire().await);
        assert!(started.elapsed().as_millis() >= 5);
        assert_eq!(limiter.config().requests_per_second, 50);
    }
}
