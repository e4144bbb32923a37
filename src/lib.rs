//! Repo Discovery - GitHub repository search with quality scoring
//!
//! Searches GitHub through a shared rate limiter and TTL cache, then scores
//! every hit on documentation, maintenance, community and code quality.

pub mod api;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod github;
pub mod limiter;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use discovery::{DiscoveryService, SearchSpec, SortBy, TimePeriod};
pub use error::{DiscoveryError, Result};
pub use tasks::spawn_cleanup_task;
