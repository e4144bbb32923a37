//! GitHub data models
//!
//! Typed views of the upstream payloads the discovery service reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository owner as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Owner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

// == Repository ==
/// A repository search hit, optionally enriched with quality data.
///
/// Identity is the upstream numeric `id`. The trailing optional fields are
/// filled in by the discovery service and are never required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub owner: Owner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QualityMetrics>,
}

// == Quality Metrics ==
/// Per-dimension quality scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QualityMetrics {
    pub documentation_score: f64,
    pub maintenance_score: f64,
    pub community_score: f64,
    pub code_quality_score: f64,
}

impl QualityMetrics {
    /// Midpoint scores used when the inputs could not be fetched.
    pub fn neutral() -> Self {
        Self {
            documentation_score: 0.5,
            maintenance_score: 0.5,
            community_score: 0.5,
            code_quality_score: 0.5,
        }
    }
}

/// Body of `GET /search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<Repository>,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub date: DateTime<Utc>,
}

impl CommitSummary {
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().map(|author| author.date)
    }
}

/// Body of `GET /repos/{owner}/{repo}/readme`; only the size matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadmeInfo {
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> serde_json::Value {
        json!({
            "id": 724712,
            "name": "rust",
            "full_name": "rust-lang/rust",
            "description": "Empowering everyone to build reliable and efficient software.",
            "html_url": "https://github.com/rust-lang/rust",
            "stargazers_count": 95000,
            "language": "Rust",
            "topics": ["compiler", "language"],
            "updated_at": "2024-05-01T12:00:00Z",
            "created_at": "2010-06-16T20:39:03Z",
            "owner": {"login": "rust-lang", "avatar_url": "https://avatars.githubusercontent.com/u/5430905"},
            "forks_count": 12000
        })
    }

    #[test]
    fn test_repository_deserialize_ignores_unknown_fields() {
        let repo: Repository = serde_json::from_value(sample_item()).unwrap();

        assert_eq!(repo.id, 724712);
        assert_eq!(repo.owner.login, "rust-lang");
        assert_eq!(repo.topics.len(), 2);
        assert!(repo.quality_score.is_none());
        assert!(repo.metrics.is_none());
    }

    #[test]
    fn test_unenriched_repository_omits_enrichment_fields() {
        let repo: Repository = serde_json::from_value(sample_item()).unwrap();
        let out = serde_json::to_value(&repo).unwrap();

        assert!(out.get("quality_score").is_none());
        assert!(out.get("metrics").is_none());
        assert!(out.get("commit_count").is_none());
    }

    #[test]
    fn test_repository_tolerates_null_language() {
        let mut item = sample_item();
        item["language"] = json!(null);
        item["description"] = json!(null);

        let repo: Repository = serde_json::from_value(item).unwrap();
        assert!(repo.language.is_none());
        assert!(repo.description.is_none());
    }

    #[test]
    fn test_commit_summary_without_author() {
        let commit: CommitSummary =
            serde_json::from_value(json!({"sha": "abc", "commit": {"author": null}})).unwrap();
        assert!(commit.authored_at().is_none());
    }
}
