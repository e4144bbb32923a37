//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::limiter::RateLimitConfig;

/// Default upstream base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the GitHub API, None = anonymous access
    pub github_token: Option<String>,
    /// Base URL of the GitHub REST API
    pub api_base_url: String,
    /// TTL in seconds for search results, endpoint responses and metrics
    pub cache_ttl: u64,
    /// Default TTL in seconds for cache entries stored without explicit TTL
    pub default_ttl: u64,
    /// Minimum star count every search is filtered on
    pub min_stars: u32,
    /// Page size requested from the search endpoint
    pub per_page: u32,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GITHUB_TOKEN` - Bearer token (default: unset)
    /// - `GITHUB_API_URL` - API base URL (default: https://api.github.com)
    /// - `CACHE_TTL` - Result TTL in seconds (default: 600)
    /// - `DEFAULT_TTL` - Default cache TTL in seconds (default: 300)
    /// - `MIN_STARS` - Star threshold for searches (default: 10)
    /// - `PER_PAGE` - Search page size (default: 100)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            github_token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            api_base_url: env::var("GITHUB_API_URL").unwrap_or(defaults.api_base_url),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            min_stars: parse_var("MIN_STARS").unwrap_or(defaults.min_stars),
            per_page: parse_var("PER_PAGE").unwrap_or(defaults.per_page),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Derives the rate limit budget from token presence.
    ///
    /// Authenticated clients get GitHub's 5000 requests per hour with a short
    /// pacing delay; anonymous clients get 60 per hour and a one second delay.
    pub fn rate_limit(&self) -> RateLimitConfig {
        let hour = Duration::from_secs(3600);
        match self.github_token {
            Some(_) => RateLimitConfig::new(5000, hour, Duration::from_millis(100)),
            None => RateLimitConfig::new(60, hour, Duration::from_millis(1000)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: DEFAULT_API_URL.to_string(),
            cache_ttl: 600,
            default_ttl: 300,
            min_stars: 10,
            per_page: 100,
            server_port: 3000,
            cleanup_interval: 30,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
