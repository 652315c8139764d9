//! This module provides the main entry point for the raincheck client.
//! It answers "what is the weather likely to be at (lat, lon) on this
//! date" from decades of historical observations, caching each answer per
//! location/calendar-day bucket so repeat queries are cheap and improve as
//! new years of data become available.

use crate::cache::store::{FileStore, PredictionStore};
use crate::error::RaincheckError;
use crate::history::power::PowerClient;
use crate::history::provider::HistoryProvider;
use crate::insight::gemini::{GeminiClient, GeminiConfig, DEFAULT_INSIGHT_MODEL, DEFAULT_VERIFICATION_MODEL};
use crate::insight::reasoning::InsightAgent;
use crate::insight::verification::VerificationAgent;
use crate::orchestrator::{Orchestrator, PredictRequest};
use crate::types::response::PredictionResult;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

/// The main client for calendar-day weather predictions.
///
/// The client owns its dependencies (the prediction store, the
/// historical-data source, and the optional enrichment agents) as explicit
/// objects constructed once, rather than ambient global state.
///
/// Create an instance using [`Raincheck::new()`] for default behavior (a
/// file-backed cache in the standard cache directory, the NASA POWER data
/// source, enrichment disabled) or [`Raincheck::custom()`] to wire in your
/// own store, data source, or a Gemini configuration.
///
/// # Examples
///
/// ```rust
/// # use raincheck::{Raincheck, RaincheckError};
/// # async fn run() -> Result<(), RaincheckError> {
/// let client = Raincheck::new().await?;
///
/// let prediction = client
///     .predict()
///     .lat(12.9716)
///     .lon(77.5946)
///     .date("2026-06-15")
///     .call()
///     .await?;
///
/// println!(
///     "{}% chance of rain ({})",
///     prediction.statistics.precipitation_probability_percent,
///     prediction.cache_status
/// );
/// # Ok(())
/// # }
/// ```
pub struct Raincheck {
    store: Arc<dyn PredictionStore>,
    history: Arc<dyn HistoryProvider>,
    insight: InsightAgent,
    verifier: VerificationAgent,
}

#[bon]
impl Raincheck {
    /// Creates a client with the default file-backed cache directory.
    ///
    /// The directory is determined via the `dirs` crate (e.g.
    /// `~/.cache/raincheck_cache` on Linux) and created if absent.
    ///
    /// # Errors
    ///
    /// Returns [`RaincheckError::CacheDirResolution`] if the cache directory
    /// cannot be determined, or [`RaincheckError::CacheDirCreation`] if it
    /// cannot be created.
    pub async fn new() -> Result<Self, RaincheckError> {
        let cache_folder = get_cache_dir()?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Creates a client caching into a specific directory.
    ///
    /// # Arguments
    ///
    /// * `cache_folder` - Directory for the per-key prediction documents.
    ///   Created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`RaincheckError::CacheDirCreation`] if the directory cannot
    /// be created.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, RaincheckError> {
        ensure_cache_dir_exists(&cache_folder).await?;
        Ok(Self::custom()
            .store(Arc::new(FileStore::new(cache_folder)))
            .call())
    }

    /// Creates a client from explicit dependencies.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.store(Arc<dyn PredictionStore>)`: **Required.** The cache backend.
    /// * `.history(Arc<dyn HistoryProvider>)`: Optional. The historical-data
    ///   source; defaults to the NASA POWER client.
    /// * `.gemini(GeminiConfig)`: Optional. Enables the insight and
    ///   verification agents. Without it both degrade gracefully: responses
    ///   carry no `ai_insight` and a `skipped` verification.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use raincheck::{Raincheck, MemoryStore, GeminiConfig};
    /// # use std::sync::Arc;
    /// let client = Raincheck::custom()
    ///     .store(Arc::new(MemoryStore::new()))
    ///     .gemini(GeminiConfig::new("api-key"))
    ///     .call();
    /// ```
    #[builder]
    pub fn custom(
        store: Arc<dyn PredictionStore>,
        history: Option<Arc<dyn HistoryProvider>>,
        gemini: Option<GeminiConfig>,
    ) -> Self {
        let history = history.unwrap_or_else(|| Arc::new(PowerClient::new()));
        let client = gemini
            .as_ref()
            .map(|config| Arc::new(GeminiClient::new(config.api_key.clone())));
        let insight_model = gemini
            .as_ref()
            .map(|config| config.insight_model.clone())
            .unwrap_or_else(|| DEFAULT_INSIGHT_MODEL.to_string());
        let verification_model = gemini
            .as_ref()
            .map(|config| config.verification_model.clone())
            .unwrap_or_else(|| DEFAULT_VERIFICATION_MODEL.to_string());

        Self {
            store,
            history,
            insight: InsightAgent::new(client.clone(), insight_model),
            verifier: VerificationAgent::new(client, verification_model),
        }
    }

    /// Predicts the likely weather at a location on a calendar date.
    ///
    /// On the first query for a (rounded location, month/day) bucket the
    /// full history is fetched, summarized and cached. Later queries are
    /// served from the cache; once new calendar years elapse, only those
    /// years are requested from the source before the summary is recomputed
    /// and the entry refreshed in place. A refresh that fails falls back to
    /// the last-known-good entry with a `warning` attached.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.lat(f64)`: **Required.** Latitude in `[-90, 90]`.
    /// * `.lon(f64)`: **Required.** Longitude in `[-180, 180]`.
    /// * `.date(&str)`: **Required.** Target date, `YYYY-MM-DD`. The year
    ///   may lie in the future; the response then carries a
    ///   `missing_data_alert` and a reduced confidence score.
    /// * `.activity(&str)`: Optional. What the user plans to do; only
    ///   flavors the generated insight.
    /// * `.part_of_day(&str)`: Optional. E.g. `"morning"`; only flavors the
    ///   generated insight.
    /// * `.already_passed(bool)`: Optional. The client's belief about
    ///   whether the date has passed; a disagreement with the server clock
    ///   is logged, the server's verdict is returned either way.
    ///
    /// # Errors
    ///
    /// Returns [`RaincheckError::InvalidLatitude`] /
    /// [`RaincheckError::InvalidLongitude`] / [`RaincheckError::InvalidDate`]
    /// for malformed input, [`RaincheckError::NoDataAvailable`] when the
    /// source has no observations for the coordinates, and
    /// [`RaincheckError::DataSource`] when the initial full fetch fails.
    /// A failed *incremental* refresh is not an error: the stale entry is
    /// returned with `cache_status = "hit_stale"` and a `warning`.
    #[builder]
    pub async fn predict(
        &self,
        lat: f64,
        lon: f64,
        date: &str,
        activity: Option<&str>,
        part_of_day: Option<&str>,
        already_passed: Option<bool>,
    ) -> Result<PredictionResult, RaincheckError> {
        let orchestrator = Orchestrator {
            store: self.store.as_ref(),
            history: self.history.as_ref(),
            insight: &self.insight,
            verifier: &self.verifier,
        };
        orchestrator
            .predict(
                PredictRequest {
                    lat,
                    lon,
                    date,
                    activity,
                    part_of_day,
                    already_passed,
                },
                Utc::now(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;
    use crate::history::error::HistoryError;
    use crate::types::observation::DayObservation;
    use crate::types::response::CacheStatus;
    use async_trait::async_trait;
    use chrono::{Datelike, Utc};

    struct FlatHistory;

    #[async_trait]
    impl HistoryProvider for FlatHistory {
        async fn day_history(
            &self,
            _lat: f64,
            _lon: f64,
            _month: u32,
            _day: u32,
            years: Option<&[i32]>,
        ) -> Result<Vec<DayObservation>, HistoryError> {
            let all: Vec<i32> = (1981..=Utc::now().year()).collect();
            let selected: Vec<i32> = match years {
                Some(list) => list.to_vec(),
                None => all,
            };
            Ok(selected
                .into_iter()
                .map(|year| DayObservation {
                    year,
                    precipitation_mm: 0.4,
                    temperature_celsius: 21.0,
                    max_temperature_celsius: 27.0,
                    min_temperature_celsius: 15.0,
                    wind_speed_mps: 2.0,
                    humidity_percent: 55.0,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn repeat_queries_are_served_from_the_cache() {
        let client = Raincheck::custom()
            .store(Arc::new(MemoryStore::new()))
            .history(Arc::new(FlatHistory))
            .call();

        let first = client
            .predict()
            .lat(52.52)
            .lon(13.40)
            .date("2020-06-15")
            .call()
            .await
            .unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);

        let second = client
            .predict()
            .lat(52.52)
            .lon(13.40)
            .date("2020-06-15")
            .call()
            .await
            .unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.statistics, first.statistics);
    }

    #[tokio::test]
    async fn nearby_coordinates_share_a_cached_prediction() {
        let client = Raincheck::custom()
            .store(Arc::new(MemoryStore::new()))
            .history(Arc::new(FlatHistory))
            .call();

        let first = client
            .predict()
            .lat(52.5200)
            .lon(13.4049)
            .date("2020-06-15")
            .call()
            .await
            .unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);

        // ~100 m away: same bucket, no second fetch.
        let second = client
            .predict()
            .lat(52.5209)
            .lon(13.4041)
            .date("2020-06-15")
            .call()
            .await
            .unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
    }
}
