//! The response shape returned by [`crate::Raincheck::predict`].

use crate::cache::advisory::MissingDataAlert;
use crate::types::enrichment::{AiInsight, Verification};
use crate::types::statistics::DayStatistics;
use serde::Serialize;
use std::fmt;

/// How the returned result relates to the prediction store at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// No cached entry existed; the full history was fetched and persisted.
    Miss,
    /// A cached entry covered every elapsed year and was returned as stored.
    Hit,
    /// The entry was stale and the refresh failed; the stale entry was
    /// returned with a warning attached.
    HitStale,
    /// The entry was stale, refreshed with the newly elapsed years, and the
    /// recomputed result was returned.
    Updated,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            CacheStatus::Miss => "miss",
            CacheStatus::Hit => "hit",
            CacheStatus::HitStale => "hit_stale",
            CacheStatus::Updated => "updated",
        };
        write!(f, "{}", tag)
    }
}

/// Echo of the request, as interpreted by the server.
#[derive(Debug, Clone, Serialize)]
pub struct QueryEcho {
    pub lat: f64,
    pub lon: f64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_day: Option<String>,
}

/// A complete prediction for one (location, calendar day) query.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub query: QueryEcho,
    pub statistics: DayStatistics,
    pub confidence_score: f64,
    pub cache_status: CacheStatus,
    /// Whether the target date lies in the past relative to the server clock.
    pub server_already_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_data_alert: Option<MissingDataAlert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insight: Option<AiInsight>,
    /// Present only on `hit_stale` responses: why the refresh was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
