//! Search specification and upstream query construction.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::build_key;

// == Time Period ==
/// Recency window applied through GitHub's `pushed:>` qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl TimePeriod {
    pub fn days(self) -> i64 {
        match self {
            TimePeriod::Week => 7,
            TimePeriod::Month => 30,
            TimePeriod::Quarter => 90,
            TimePeriod::Year => 365,
        }
    }
}

impl FromStr for TimePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(TimePeriod::Week),
            "month" => Ok(TimePeriod::Month),
            "quarter" => Ok(TimePeriod::Quarter),
            "year" => Ok(TimePeriod::Year),
            other => Err(format!(
                "unknown time period '{}', expected week, month, quarter or year",
                other
            )),
        }
    }
}

// == Sort By ==
/// Result ordering. Every order is descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Quality,
    Stars,
    Updated,
    Created,
}

impl SortBy {
    /// Parses a sort name, falling back to [`SortBy::Quality`] for anything
    /// unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "stars" => SortBy::Stars,
            "updated" => SortBy::Updated,
            "created" => SortBy::Created,
            _ => SortBy::Quality,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortBy::Quality => "quality",
            SortBy::Stars => "stars",
            SortBy::Updated => "updated",
            SortBy::Created => "created",
        };
        f.write_str(name)
    }
}

// == Search Spec ==
/// What a caller asks the discovery service for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub time_period: Option<TimePeriod>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
}

impl SearchSpec {
    /// Cache key covering every field of the spec.
    pub fn cache_key(&self) -> String {
        build_key(&json!({
            "type": "search",
            "query": self.query,
            "language": self.language,
            "timePeriod": self.time_period,
            "sortBy": self.sort_by,
        }))
    }

    /// Builds the GitHub search expression for this spec as of `today`.
    ///
    /// Always filters on `stars:>{min_stars}`, then appends the language
    /// qualifier, the free text, and the `pushed:>` recency cutoff.
    pub fn search_expression(&self, min_stars: u32, today: NaiveDate) -> String {
        let mut expression = format!("stars:>{}", min_stars);

        if let Some(language) = non_empty(&self.language) {
            expression.push_str(&format!(" language:{}", language));
        }
        if let Some(query) = non_empty(&self.query) {
            expression.push(' ');
            expression.push_str(query);
        }
        if let Some(period) = self.time_period {
            let since = today - Duration::days(period.days());
            expression.push_str(&format!(" pushed:>{}", since.format("%Y-%m-%d")));
        }

        expression
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Endpoint for one page of repository search results, sorted by stars.
pub fn search_endpoint(expression: &str, per_page: u32) -> String {
    format!(
        "/search/repositories?q={}&sort=stars&order=desc&per_page={}",
        urlencoding::encode(expression),
        per_page
    )
}
