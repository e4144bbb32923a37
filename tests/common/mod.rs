//! Shared test fixtures: a scripted upstream and service builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use repo_discovery::cache::{shared, CacheStore};
use repo_discovery::discovery::{DiscoveryService, DiscoverySettings};
use repo_discovery::github::{HttpFetch, RateLimitHeaders, UpstreamResponse};
use repo_discovery::limiter::{RateLimitConfig, RateLimiter};
use repo_discovery::Result;

// == Scripted Fetcher ==
/// In-memory upstream answering by endpoint prefix, first match wins.
/// Unmatched endpoints answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<Vec<(String, UpstreamResponse)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, prefix: &str, status: u16, body: Value) -> &Self {
        self.respond_with_headers(prefix, status, body, RateLimitHeaders::default())
    }

    pub fn respond_with_headers(
        &self,
        prefix: &str,
        status: u16,
        body: Value,
        rate_limit: RateLimitHeaders,
    ) -> &Self {
        self.routes.lock().unwrap().push((
            prefix.to_string(),
            UpstreamResponse {
                status,
                rate_limit,
                body,
            },
        ));
        self
    }

    /// Scripts search results for the given `(full_name, stars)` pairs.
    pub fn search_results(&self, repos: &[(&str, u64)]) -> &Self {
        let items: Vec<Value> = repos
            .iter()
            .enumerate()
            .map(|(i, (full_name, stars))| search_item(i as u64 + 1, full_name, *stars))
            .collect();
        self.respond(
            "/search/repositories",
            200,
            json!({"total_count": items.len(), "items": items}),
        )
    }

    /// Scripts commits, contributors and README for a repository.
    pub fn healthy_repo(&self, full_name: &str, contributors: usize, readme_size: u64) -> &Self {
        let people: Vec<Value> = (0..contributors)
            .map(|i| json!({"login": format!("dev{}", i)}))
            .collect();

        self.respond(
            &format!("/repos/{}/commits", full_name),
            200,
            json!([{"sha": "abc123", "commit": {"author": {"date": Utc::now().to_rfc3339()}}}]),
        )
        .respond(
            &format!("/repos/{}/contributors", full_name),
            200,
            Value::Array(people),
        )
        .respond(
            &format!("/repos/{}/readme", full_name),
            200,
            json!({"name": "README.md", "size": readme_size}),
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|endpoint| endpoint.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetcher {
    async fn fetch_json(&self, endpoint: &str) -> Result<UpstreamResponse> {
        self.calls.lock().unwrap().push(endpoint.to_string());

        let routes = self.routes.lock().unwrap();
        let response = routes
            .iter()
            .find(|(prefix, _)| endpoint.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or(UpstreamResponse {
                status: 404,
                rate_limit: RateLimitHeaders::default(),
                body: json!({"message": "Not Found"}),
            });

        Ok(response)
    }
}

pub fn search_item(id: u64, full_name: &str, stars: u64) -> Value {
    let (owner, name) = full_name.split_once('/').unwrap_or(("owner", full_name));
    json!({
        "id": id,
        "name": name,
        "full_name": full_name,
        "description": format!("{} description", name),
        "html_url": format!("https://github.com/{}", full_name),
        "stargazers_count": stars,
        "language": "Rust",
        "topics": [],
        "updated_at": "2024-01-0".to_string() + &id.min(9).to_string() + "T00:00:00Z",
        "created_at": "2020-01-0".to_string() + &id.min(9).to_string() + "T00:00:00Z",
        "owner": {"login": owner, "avatar_url": ""}
    })
}

/// Limiter with a generous budget and no pacing delay.
pub fn fast_limiter(max_requests: u32) -> RateLimiter {
    RateLimiter::new(RateLimitConfig::new(
        max_requests,
        Duration::from_secs(3600),
        Duration::ZERO,
    ))
}

pub fn service_with_limiter(fetcher: Arc<ScriptedFetcher>, limiter: RateLimiter) -> DiscoveryService {
    DiscoveryService::new(
        fetcher,
        shared(CacheStore::new(300)),
        limiter,
        DiscoverySettings::default(),
    )
}

pub fn service(fetcher: Arc<ScriptedFetcher>) -> DiscoveryService {
    service_with_limiter(fetcher, fast_limiter(10_000))
}
