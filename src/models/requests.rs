//! Request DTOs for the discovery API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

use crate::discovery::{SearchSpec, SortBy, TimePeriod};
use crate::error::{DiscoveryError, Result};

/// Query string of `GET /repositories`.
///
/// # Fields
/// - `query`: Free text appended to the search expression
/// - `language`: Language filter
/// - `time_period`: One of week, month, quarter, year
/// - `sort_by`: One of quality, stars, updated, created (anything else sorts by quality)
///
/// Empty values are treated as absent, as HTML forms submit them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

impl SearchRequest {
    /// Validates the request and converts it into a [`SearchSpec`].
    pub fn into_spec(self) -> Result<SearchSpec> {
        let time_period = match present(self.time_period) {
            Some(period) => Some(
                period
                    .parse::<TimePeriod>()
                    .map_err(DiscoveryError::InvalidRequest)?,
            ),
            None => None,
        };

        Ok(SearchSpec {
            query: present(self.query),
            language: present(self.language),
            time_period,
            sort_by: present(self.sort_by).map(|s| SortBy::parse_lenient(&s)),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
