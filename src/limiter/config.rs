//! Rate limit configuration.

use std::time::Duration;

// == Rate Limit Config ==
/// Budget and pacing applied to every outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Calls admitted per window
    pub max_requests: u32,
    /// Window length
    pub interval: Duration,
    /// Pause after every executed call
    pub min_delay: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, interval: Duration, min_delay: Duration) -> Self {
        Self {
            max_requests,
            interval,
            min_delay,
        }
    }

    /// Merges the fields present in `update`, leaving the rest untouched.
    pub fn merge(&mut self, update: RateLimitUpdate) {
        if let Some(max_requests) = update.max_requests {
            self.max_requests = max_requests;
        }
        if let Some(interval) = update.interval {
            self.interval = interval;
        }
        if let Some(min_delay) = update.min_delay {
            self.min_delay = min_delay;
        }
    }
}

impl Default for RateLimitConfig {
    /// Conservative budget used until the service configures the limiter.
    fn default() -> Self {
        Self {
            max_requests: 30,
            interval: Duration::from_secs(3600),
            min_delay: Duration::from_millis(1000),
        }
    }
}

impl From<RateLimitConfig> for RateLimitUpdate {
    fn from(config: RateLimitConfig) -> Self {
        Self {
            max_requests: Some(config.max_requests),
            interval: Some(config.interval),
            min_delay: Some(config.min_delay),
        }
    }
}

// == Rate Limit Update ==
/// Partial configuration for [`crate::limiter::RateLimiter::configure`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitUpdate {
    pub max_requests: Option<u32>,
    pub interval: Option<Duration>,
    pub min_delay: Option<Duration>,
}
