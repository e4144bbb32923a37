//! Discovery Module
//!
//! Repository search, quality metrics and scoring on top of the cache and the
//! rate limiter.

mod query;
mod scoring;
mod service;

pub use query::{search_endpoint, SearchSpec, SortBy, TimePeriod};
pub use scoring::{calculate_quality_score, CODE_QUALITY_BASELINE};
pub use service::{sort_repositories, DiscoverySettings, DiscoveryService};
