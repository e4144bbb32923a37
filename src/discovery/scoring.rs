//! Quality scoring
//!
//! Pure functions turning fetched repository facts into [`QualityMetrics`] and
//! a single weighted score.

use chrono::{DateTime, Utc};

use crate::github::QualityMetrics;

/// README size at which the documentation bonus saturates.
const README_SIZE_SCALE: f64 = 50_000.0;
/// Contributor count at which the community score saturates.
const CONTRIBUTOR_SCALE: f64 = 10.0;
/// Fixed code quality dimension; no static analysis is performed.
pub const CODE_QUALITY_BASELINE: f64 = 0.7;

const DOCUMENTATION_WEIGHT: f64 = 0.25;
const MAINTENANCE_WEIGHT: f64 = 0.30;
const COMMUNITY_WEIGHT: f64 = 0.25;
const CODE_QUALITY_WEIGHT: f64 = 0.20;

/// 0.2 without a README, otherwise 0.8 plus a size bonus capped at 1.
pub fn documentation_score(readme_size: Option<u64>) -> f64 {
    match readme_size {
        None => 0.2,
        Some(size) => (0.8 + (size as f64 / README_SIZE_SCALE) * 0.2).min(1.0),
    }
}

/// Decays linearly from 1 to 0 over the year following the last commit.
///
/// A repository without commits scores 0.
pub fn maintenance_score(last_commit: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last_commit) = last_commit else {
        return 0.0;
    };

    let days = (now - last_commit).num_milliseconds() as f64 / 86_400_000.0;
    (1.0 - days / 365.0).clamp(0.0, 1.0)
}

pub fn community_score(contributors: usize) -> f64 {
    (contributors as f64 / CONTRIBUTOR_SCALE).min(1.0)
}

pub fn build_metrics(
    readme_size: Option<u64>,
    last_commit: Option<DateTime<Utc>>,
    contributors: usize,
    now: DateTime<Utc>,
) -> QualityMetrics {
    QualityMetrics {
        documentation_score: documentation_score(readme_size),
        maintenance_score: maintenance_score(last_commit, now),
        community_score: community_score(contributors),
        code_quality_score: CODE_QUALITY_BASELINE,
    }
}

// == Quality Score ==
/// Weighted sum of the four dimensions, in `[0, 1]`.
pub fn calculate_quality_score(metrics: &QualityMetrics) -> f64 {
    metrics.documentation_score * DOCUMENTATION_WEIGHT
        + metrics.maintenance_score * MAINTENANCE_WEIGHT
        + metrics.community_score * COMMUNITY_WEIGHT
        + metrics.code_quality_score * CODE_QUALITY_WEIGHT
}
