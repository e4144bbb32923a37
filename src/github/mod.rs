//! GitHub Module
//!
//! Upstream client seam and the payload types read from the GitHub REST API.

mod client;
mod models;

pub use client::{GitHubClient, HttpFetch, RateLimitHeaders, UpstreamResponse};
pub use models::{
    CommitAuthor, CommitDetail, CommitSummary, Owner, QualityMetrics, ReadmeInfo, Repository,
    SearchResults,
};
