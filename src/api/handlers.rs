//! API Handlers
//!
//! HTTP request handlers for each discovery endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::discovery::DiscoveryService;
use crate::error::Result;
use crate::limiter::RateLimitStatus;
use crate::models::{HealthResponse, SearchRequest, SearchResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Discovery service, owning the shared cache and rate limiter handles
    pub discovery: Arc<DiscoveryService>,
}

impl AppState {
    pub fn new(discovery: DiscoveryService) -> Self {
        Self {
            discovery: Arc::new(discovery),
        }
    }
}

/// Handler for GET /repositories
///
/// Searches, scores and sorts repositories for the query string.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(req): Query<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let spec = req.into_spec()?;
    let repositories = state.discovery.search_repositories(&spec).await?;

    Ok(Json(SearchResponse::new(repositories)))
}

/// Handler for GET /rate-limit
///
/// Reports the shared limiter's budget so callers can render a countdown.
pub async fn rate_limit_handler(State(state): State<AppState>) -> Json<RateLimitStatus> {
    Json(state.discovery.limiter().status().await)
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.discovery.cache().read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
