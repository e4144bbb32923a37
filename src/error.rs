//! Error types for the discovery service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Discovery Error Enum ==
/// Unified error type for the discovery service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// Upstream quota exhausted, either observed locally or reported by GitHub
    #[error("{message}")]
    RateLimitExceeded {
        message: String,
        /// HTTP status associated with the failure (429 local, 403 upstream)
        status: u16,
        /// Unix seconds at which the quota window resets
        reset_at: u64,
    },

    /// Upstream answered with a non-success status
    #[error("GitHub API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Network or body decoding failure, no status available
    #[error("Failed to fetch from GitHub API: {0}")]
    Transport(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DiscoveryError {
    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DiscoveryError::RateLimitExceeded { status, .. } => Some(*status),
            DiscoveryError::Upstream { status, .. } => Some(*status),
            DiscoveryError::Transport(_) | DiscoveryError::InvalidRequest(_) => None,
        }
    }

    /// Returns the quota reset time in Unix seconds for rate-limit failures.
    pub fn rate_limit_reset(&self) -> Option<u64> {
        match self {
            DiscoveryError::RateLimitExceeded { reset_at, .. } => Some(*reset_at),
            _ => None,
        }
    }

    /// True when the failure is a rate-limit rejection.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DiscoveryError::RateLimitExceeded { .. })
    }
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        DiscoveryError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::Transport(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for DiscoveryError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match &self {
            DiscoveryError::RateLimitExceeded { reset_at, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": message, "reset_at": reset_at }),
            ),
            DiscoveryError::Upstream { status, .. } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": message, "status": status }),
            ),
            DiscoveryError::Transport(_) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": message }))
            }
            DiscoveryError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the discovery service.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
