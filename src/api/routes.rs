//! API Routes
//!
//! Configures the Axum router with all discovery endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, rate_limit_handler, search_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /repositories` - Search and score repositories
/// - `GET /rate-limit` - Shared rate limiter status
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/repositories", get(search_handler))
        .route("/rate-limit", get(rate_limit_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use crate::cache::{shared, CacheStore};
    use crate::discovery::{DiscoveryService, DiscoverySettings};
    use crate::error::{DiscoveryError, Result};
    use crate::github::{HttpFetch, UpstreamResponse};
    use crate::limiter::{RateLimitConfig, RateLimiter};

    struct OfflineFetcher;

    #[async_trait]
    impl HttpFetch for OfflineFetcher {
        async fn fetch_json(&self, _endpoint: &str) -> Result<UpstreamResponse> {
            Err(DiscoveryError::Transport("network unreachable".to_string()))
        }
    }

    fn create_test_app() -> Router {
        let limiter = RateLimiter::new(RateLimitConfig::new(
            10,
            Duration::from_secs(3600),
            Duration::ZERO,
        ));
        let service = DiscoveryService::new(
            Arc::new(OfflineFetcher),
            shared(CacheStore::new(300)),
            limiter,
            DiscoverySettings::default(),
        );
        create_router(AppState::new(service))
    }

    async fn get_status(uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(get_status("/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(get_status("/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_endpoint() {
        assert_eq!(get_status("/rate-limit").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_transport_failure_is_bad_gateway() {
        assert_eq!(
            get_status("/repositories?language=rust").await,
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_search_invalid_period_is_bad_request() {
        assert_eq!(
            get_status("/repositories?time_period=decade").await,
            StatusCode::BAD_REQUEST
        );
    }
}
