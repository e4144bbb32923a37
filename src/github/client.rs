//! GitHub HTTP client
//!
//! The discovery service only needs "GET this endpoint and tell me the status,
//! the quota headers and the JSON body". [`HttpFetch`] is that seam;
//! [`GitHubClient`] is the reqwest implementation used in production.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;

const USER_AGENT: &str = concat!("repo_discovery/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

// == Rate Limit Headers ==
/// Quota headers reported with every GitHub response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// `x-ratelimit-remaining`
    pub remaining: Option<u32>,
    /// `x-ratelimit-reset`, Unix seconds
    pub reset: Option<u64>,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        fn parse<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
        }

        Self {
            remaining: parse(headers, "x-ratelimit-remaining"),
            reset: parse(headers, "x-ratelimit-reset"),
        }
    }
}

// == Upstream Response ==
/// Status, quota headers and decoded body of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub rate_limit: RateLimitHeaders,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human readable failure reason: GitHub's `message` field when present,
    /// otherwise the canonical reason phrase of the status.
    pub fn error_message(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                reqwest::StatusCode::from_u16(self.status)
                    .ok()
                    .and_then(|status| status.canonical_reason())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

// == Http Fetch Trait ==
/// Performs a GET against an API-relative endpoint such as `/repos/a/b`.
///
/// Implementations report application-level failures through
/// [`UpstreamResponse::status`] and reserve `Err` for transport failures.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch_json(&self, endpoint: &str) -> Result<UpstreamResponse>;
}

// == GitHub Client ==
/// reqwest-backed GitHub REST client.
///
/// No request timeout is set; callers sharing the rate limiter queue wait on
/// a hung request.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: ReqwestClient,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.github_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl HttpFetch for GitHubClient {
    async fn fetch_json(&self, endpoint: &str) -> Result<UpstreamResponse> {
        let mut request = self.http.get(self.url(endpoint)).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let rate_limit = RateLimitHeaders::from_headers(response.headers());
        let bytes = response.bytes().await?;

        debug!(endpoint, status, remaining = ?rate_limit.remaining, "GitHub response");

        // Error bodies are informational only; success bodies must decode
        let body = if (200..300).contains(&status) {
            serde_json::from_slice(&bytes)?
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Ok(UpstreamResponse {
            status,
            rate_limit,
            body,
        })
    }
}
