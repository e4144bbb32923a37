//! Rate Limiter Module
//!
//! Global admission control and pacing for every call made to the upstream API.

mod config;
mod queue;

pub use config::{RateLimitConfig, RateLimitUpdate};
pub use queue::{RateLimitStatus, RateLimiter};
