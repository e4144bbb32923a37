//! Discovery Service
//!
//! Turns a [`SearchSpec`] into a scored, sorted repository list. Every
//! upstream call goes through the shared [`RateLimiter`], and every successful
//! response is written to the shared cache under its endpoint.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::SharedCache;
use crate::config::Config;
use crate::discovery::query::{search_endpoint, SearchSpec, SortBy};
use crate::discovery::scoring::{build_metrics, calculate_quality_score};
use crate::error::{DiscoveryError, Result};
use crate::github::{
    CommitSummary, HttpFetch, QualityMetrics, ReadmeInfo, Repository, SearchResults,
    UpstreamResponse,
};
use crate::limiter::RateLimiter;

// == Discovery Settings ==
/// Tunables of the discovery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// TTL in seconds for search results, endpoint responses and metrics
    pub cache_ttl: u64,
    /// Star threshold every search is filtered on
    pub min_stars: u32,
    /// Search page size
    pub per_page: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            cache_ttl: 600,
            min_stars: 10,
            per_page: 100,
        }
    }
}

impl From<&Config> for DiscoverySettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: config.cache_ttl,
            min_stars: config.min_stars,
            per_page: config.per_page,
        }
    }
}

// == Discovery Service ==
pub struct DiscoveryService {
    fetcher: Arc<dyn HttpFetch>,
    cache: SharedCache,
    limiter: RateLimiter,
    settings: DiscoverySettings,
}

impl DiscoveryService {
    /// Assembles a service from already configured collaborators.
    pub fn new(
        fetcher: Arc<dyn HttpFetch>,
        cache: SharedCache,
        limiter: RateLimiter,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            fetcher,
            cache,
            limiter,
            settings,
        }
    }

    /// Assembles a service and sizes the limiter budget from token presence.
    pub async fn from_config(
        config: &Config,
        fetcher: Arc<dyn HttpFetch>,
        cache: SharedCache,
        limiter: RateLimiter,
    ) -> Self {
        if config.github_token.is_none() {
            warn!("GitHub token not found. API requests will be rate-limited.");
        }
        limiter.configure(config.rate_limit()).await;

        Self::new(fetcher, cache, limiter, DiscoverySettings::from(config))
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    // == Search Repositories ==
    /// Searches, scores and sorts repositories matching `spec`.
    ///
    /// Fails fast without touching the network when the local budget is
    /// exhausted. Identical specs within the cache TTL are served from cache.
    pub async fn search_repositories(&self, spec: &SearchSpec) -> Result<Vec<Repository>> {
        self.check_rate_limit().await?;

        let key = spec.cache_key();
        if let Some(cached) = self.cache.write().await.get::<Vec<Repository>>(&key) {
            debug!(key = %key, "Search served from cache");
            return Ok(cached);
        }

        let expression = spec.search_expression(self.settings.min_stars, Utc::now().date_naive());
        let endpoint = search_endpoint(&expression, self.settings.per_page);
        debug!(query = %expression, "Searching repositories");

        let body = self.fetch(&endpoint).await?;
        let results: SearchResults = serde_json::from_value(body)?;

        let mut repositories =
            join_all(results.items.into_iter().map(|repo| self.enrich(repo))).await;
        sort_repositories(&mut repositories, spec.sort_by.unwrap_or_default());

        if let Err(err) = self
            .cache
            .write()
            .await
            .set(key, &repositories, Some(self.settings.cache_ttl))
        {
            warn!(error = %err, "Failed to cache search results");
        }

        info!(
            count = repositories.len(),
            total = results.total_count,
            "Repository search completed"
        );
        Ok(repositories)
    }

    async fn check_rate_limit(&self) -> Result<()> {
        let status = self.limiter.status().await;
        if !status.limited {
            return Ok(());
        }

        let reset_at = status.reset_at;
        Err(DiscoveryError::RateLimitExceeded {
            message: format!("API rate limit exceeded. Resets at {}", format_reset(reset_at)),
            status: 429,
            reset_at,
        })
    }

    async fn enrich(&self, mut repo: Repository) -> Repository {
        let metrics = self.quality_metrics(&repo).await;
        repo.quality_score = Some(calculate_quality_score(&metrics));
        repo.metrics = Some(metrics);
        repo
    }

    // == Quality Metrics ==
    /// Returns cached or freshly computed metrics for `repo`.
    ///
    /// Never fails: when the inputs cannot be fetched the neutral metrics are
    /// returned (and not cached) and the failure is logged.
    pub async fn quality_metrics(&self, repo: &Repository) -> QualityMetrics {
        let key = format!("metrics:{}", repo.full_name);
        if let Some(cached) = self.cache.write().await.get::<QualityMetrics>(&key) {
            return cached;
        }

        match self.compute_metrics(&repo.full_name).await {
            Ok(metrics) => {
                if let Err(err) =
                    self.cache
                        .write()
                        .await
                        .set(key, &metrics, Some(self.settings.cache_ttl))
                {
                    warn!(error = %err, "Failed to cache quality metrics");
                }
                metrics
            }
            Err(err) => {
                error!(
                    repo = %repo.full_name,
                    error = %err,
                    "Failed to get quality metrics"
                );
                QualityMetrics::neutral()
            }
        }
    }

    async fn compute_metrics(&self, full_name: &str) -> Result<QualityMetrics> {
        let commits_endpoint = format!("/repos/{}/commits?per_page=1", full_name);
        let contributors_endpoint = format!("/repos/{}/contributors?per_page=10", full_name);
        let readme_endpoint = format!("/repos/{}/readme", full_name);

        let (commits, contributors, readme) = tokio::join!(
            self.fetch(&commits_endpoint),
            self.fetch(&contributors_endpoint),
            self.fetch(&readme_endpoint),
        );

        let commits: Vec<CommitSummary> = serde_json::from_value(commits?)?;
        let contributors: Vec<Value> = serde_json::from_value(contributors?)?;
        // A missing README is expected, not a failure
        let readme: Option<ReadmeInfo> = readme
            .ok()
            .and_then(|body| serde_json::from_value(body).ok());

        Ok(build_metrics(
            readme.map(|r| r.size),
            commits.first().and_then(CommitSummary::authored_at),
            contributors.len(),
            Utc::now(),
        ))
    }

    // == Fetch ==
    /// Cache-first, rate-limited GET of an API-relative endpoint.
    ///
    /// Successful bodies are cached under the endpoint; the limiter is
    /// resynchronized from the quota headers of every response.
    async fn fetch(&self, endpoint: &str) -> Result<Value> {
        if let Some(cached) = self.cache.write().await.get::<Value>(endpoint) {
            debug!(endpoint, "Endpoint served from cache");
            return Ok(cached);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let cache = Arc::clone(&self.cache);
        let limiter = self.limiter.clone();
        let ttl = self.settings.cache_ttl;
        let endpoint = endpoint.to_string();

        self.limiter
            .enqueue(move || async move {
                let response = fetcher.fetch_json(&endpoint).await?;

                if let (Some(remaining), Some(reset)) =
                    (response.rate_limit.remaining, response.rate_limit.reset)
                {
                    limiter.update_limits(remaining, reset).await;
                }

                check_status(&response)?;

                let stored = cache
                    .write()
                    .await
                    .set(endpoint.as_str(), &response.body, Some(ttl));
                if let Err(err) = stored {
                    warn!(endpoint = %endpoint, error = %err, "Failed to cache response");
                }

                Ok::<Value, DiscoveryError>(response.body)
            })
            .await
    }
}

/// Maps a non-success response onto the error taxonomy.
fn check_status(response: &UpstreamResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    if response.status == 403 && response.rate_limit.remaining == Some(0) {
        let reset_at = response.rate_limit.reset.unwrap_or(0);
        return Err(DiscoveryError::RateLimitExceeded {
            message: format!("API rate limit exceeded. Resets at {}", format_reset(reset_at)),
            status: 403,
            reset_at,
        });
    }

    Err(DiscoveryError::Upstream {
        status: response.status,
        message: response.error_message(),
    })
}

fn format_reset(reset_at: u64) -> String {
    Utc.timestamp_opt(reset_at as i64, 0)
        .single()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| reset_at.to_string())
}

// == Sorting ==
/// Stable descending sort; equal keys keep their upstream order.
pub fn sort_repositories(repositories: &mut [Repository], sort_by: SortBy) {
    match sort_by {
        SortBy::Quality => repositories.sort_by(|a, b| {
            b.quality_score
                .unwrap_or(0.0)
                .total_cmp(&a.quality_score.unwrap_or(0.0))
        }),
        SortBy::Stars => repositories.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        SortBy::Updated => repositories.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortBy::Created => repositories.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Owner, RateLimitHeaders};
    use chrono::{DateTime, Duration};
    use serde_json::json;

    fn repo(id: u64, stars: u64, score: Option<f64>, updated_days_ago: i64) -> Repository {
        let now: DateTime<Utc> = Utc::now();
        Repository {
            id,
            name: format!("repo{}", id),
            full_name: format!("owner/repo{}", id),
            description: None,
            html_url: String::new(),
            stargazers_count: stars,
            language: None,
            topics: vec![],
            updated_at: now - Duration::days(updated_days_ago),
            created_at: now - Duration::days(1000 - id as i64),
            owner: Owner {
                login: "owner".to_string(),
                avatar_url: String::new(),
            },
            commit_count: None,
            contributor_count: None,
            quality_score: score,
            metrics: None,
        }
    }

    fn ids(repos: &[Repository]) -> Vec<u64> {
        repos.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_sort_by_stars() {
        let mut repos = vec![repo(1, 5, None, 0), repo(2, 20, None, 0), repo(3, 1, None, 0)];
        sort_repositories(&mut repos, SortBy::Stars);

        let stars: Vec<u64> = repos.iter().map(|r| r.stargazers_count).collect();
        assert_eq!(stars, vec![20, 5, 1]);
    }

    #[test]
    fn test_sort_by_quality_is_stable() {
        let mut repos = vec![
            repo(1, 0, Some(0.5), 0),
            repo(2, 0, Some(0.9), 0),
            repo(3, 0, Some(0.5), 0),
            repo(4, 0, None, 0),
        ];
        sort_repositories(&mut repos, SortBy::Quality);

        assert_eq!(ids(&repos), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_sort_by_timestamps() {
        let mut repos = vec![repo(1, 0, None, 30), repo(2, 0, None, 1), repo(3, 0, None, 10)];

        sort_repositories(&mut repos, SortBy::Updated);
        assert_eq!(ids(&repos), vec![2, 3, 1]);

        // created_at grows with id
        sort_repositories(&mut repos, SortBy::Created);
        assert_eq!(ids(&repos), vec![3, 2, 1]);
    }

    #[test]
    fn test_check_status_rate_limited() {
        let response = UpstreamResponse {
            status: 403,
            rate_limit: RateLimitHeaders {
                remaining: Some(0),
                reset: Some(1_700_000_000),
            },
            body: json!({"message": "API rate limit exceeded"}),
        };

        let err = check_status(&response).unwrap_err();
        assert_eq!(err.rate_limit_reset(), Some(1_700_000_000));
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("2023-11-14"));
    }

    #[test]
    fn test_check_status_forbidden_with_quota_is_upstream_error() {
        let response = UpstreamResponse {
            status: 403,
            rate_limit: RateLimitHeaders {
                remaining: Some(12),
                reset: Some(1_700_000_000),
            },
            body: json!({"message": "Resource not accessible"}),
        };

        assert_eq!(
            check_status(&response),
            Err(DiscoveryError::Upstream {
                status: 403,
                message: "Resource not accessible".to_string()
            })
        );
    }

    #[test]
    fn test_check_status_success() {
        let response = UpstreamResponse {
            status: 200,
            rate_limit: RateLimitHeaders::default(),
            body: json!([]),
        };
        assert!(check_status(&response).is_ok());
    }

    struct Unreachable;

    #[async_trait::async_trait]
    impl HttpFetch for Unreachable {
        async fn fetch_json(&self, endpoint: &str) -> Result<UpstreamResponse> {
            Err(DiscoveryError::Transport(format!("unexpected fetch of {}", endpoint)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_reports_current_window_reset() {
        let limiter = RateLimiter::new(crate::limiter::RateLimitConfig::new(
            1,
            std::time::Duration::from_secs(3600),
            std::time::Duration::ZERO,
        ));
        limiter.enqueue(|| async { Ok(()) }).await.unwrap();

        let service = DiscoveryService::new(
            Arc::new(Unreachable),
            crate::cache::shared(crate::cache::CacheStore::new(300)),
            limiter.clone(),
            DiscoverySettings::default(),
        );

        let err = service
            .search_repositories(&SearchSpec::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert_eq!(err.rate_limit_reset(), Some(limiter.status().await.reset_at));
    }
}
