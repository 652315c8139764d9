//! The persisted unit of the prediction cache: one entry per
//! [`crate::CacheKey`], mutated in place as new calendar years elapse.

use crate::types::enrichment::AiInsight;
use crate::types::statistics::DayStatistics;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The coordinates as originally queried, kept for display. The rounded
/// bucket identity lives in the key, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Bookkeeping about the analyzed data range and its gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Inclusive year span of the analyzed samples, e.g. `"1981-2024"`.
    pub years_analyzed: String,
    pub total_years: usize,
    /// Maximum year actually present in the analyzed series.
    pub latest_available_year: i32,
    /// Years strictly after `latest_available_year` up to and including the
    /// queried target year, ascending. Empty when the target year is covered.
    pub missing_years: Vec<i32>,
    pub last_updated: DateTime<Utc>,
    /// December 31st of `latest_available_year`.
    pub data_complete_until: NaiveDate,
}

impl EntryMetadata {
    pub fn new(
        years_analyzed: String,
        total_years: usize,
        latest_available_year: i32,
        missing_years: Vec<i32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            years_analyzed,
            total_years,
            latest_available_year,
            missing_years,
            last_updated: now,
            data_complete_until: NaiveDate::from_ymd_opt(latest_available_year, 12, 31)
                .expect("December 31st exists in every year"),
        }
    }
}

/// One cached prediction. Created on the first miss for a key, then
/// refreshed in place; entries are never evicted, the dataset only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Canonical string form of the key, doubling as the document id.
    pub cache_key: String,
    pub location: StoredLocation,
    /// `"MM-DD"` of the calendar-day bucket.
    pub target_date: String,
    pub statistics: DayStatistics,
    pub metadata: EntryMetadata,
    /// Heuristic trust in the statistics, in [0.5, 1.0].
    pub confidence_score: f64,
    /// Enrichment payload; survives statistical refreshes untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insight: Option<AiInsight>,
    pub created_at: DateTime<Utc>,
}

/// A partial update applied to an existing entry.
///
/// An incremental refresh overwrites statistics, metadata and confidence
/// while leaving `ai_insight` alone; attaching an insight touches nothing
/// else. Fields left `None` are preserved.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub statistics: Option<DayStatistics>,
    pub metadata: Option<EntryMetadata>,
    pub confidence_score: Option<f64>,
    pub ai_insight: Option<AiInsight>,
}

impl EntryPatch {
    /// The patch written after a successful incremental refresh.
    pub fn refresh(
        statistics: DayStatistics,
        metadata: EntryMetadata,
        confidence_score: f64,
    ) -> Self {
        Self {
            statistics: Some(statistics),
            metadata: Some(metadata),
            confidence_score: Some(confidence_score),
            ai_insight: None,
        }
    }

    /// The patch written when an insight is generated for an existing entry.
    pub fn insight(insight: AiInsight) -> Self {
        Self {
            ai_insight: Some(insight),
            ..Self::default()
        }
    }

    /// Applies the patch, overwriting only the populated fields.
    pub fn apply(self, entry: &mut CacheEntry) {
        if let Some(statistics) = self.statistics {
            entry.statistics = statistics;
        }
        if let Some(metadata) = self.metadata {
            entry.metadata = metadata;
        }
        if let Some(confidence_score) = self.confidence_score {
            entry.confidence_score = confidence_score;
        }
        if let Some(ai_insight) = self.ai_insight {
            entry.ai_insight = Some(ai_insight);
        }
    }
}
