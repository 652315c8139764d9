//! The cache orchestrator: the state machine tying together lookup,
//! staleness detection, incremental refresh, recomputation, confidence and
//! disclosure, and persistence. This is the only component with side
//! effects against the store.
//!
//! Every request terminates in one of three outcomes:
//!
//! ```text
//! LOOKUP -> {MISS, HIT_FRESH, HIT_STALE} -> RESPOND
//! ```

use crate::cache::advisory::{missing_data_alert, missing_years_for_target, MissingDataAlert};
use crate::cache::confidence::confidence_score;
use crate::cache::entry::{CacheEntry, EntryMetadata, EntryPatch, StoredLocation};
use crate::cache::key::{parse_target_date, CacheKey};
use crate::cache::staleness::check_staleness;
use crate::cache::store::PredictionStore;
use crate::error::RaincheckError;
use crate::history::provider::HistoryProvider;
use crate::insight::reasoning::InsightAgent;
use crate::insight::verification::VerificationAgent;
use crate::stats::compute_statistics;
use crate::types::enrichment::AiInsight;
use crate::types::response::{CacheStatus, PredictionResult, QueryEcho};
use crate::types::statistics::DayStatistics;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::{info, warn};

pub(crate) struct PredictRequest<'a> {
    pub lat: f64,
    pub lon: f64,
    pub date: &'a str,
    pub activity: Option<&'a str>,
    pub part_of_day: Option<&'a str>,
    pub already_passed: Option<bool>,
}

pub(crate) struct Orchestrator<'a> {
    pub store: &'a dyn PredictionStore,
    pub history: &'a dyn HistoryProvider,
    pub insight: &'a InsightAgent,
    pub verifier: &'a VerificationAgent,
}

/// Request state resolved once up front and threaded through the branches.
struct RequestContext<'a> {
    request: PredictRequest<'a>,
    key: CacheKey,
    target: NaiveDate,
    now: DateTime<Utc>,
    server_already_passed: bool,
}

impl RequestContext<'_> {
    fn echo(&self) -> QueryEcho {
        QueryEcho {
            lat: self.request.lat,
            lon: self.request.lon,
            date: self.request.date.to_string(),
            activity: self.request.activity.map(str::to_string),
            part_of_day: self.request.part_of_day.map(str::to_string),
        }
    }
}

impl Orchestrator<'_> {
    pub(crate) async fn predict(
        &self,
        request: PredictRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<PredictionResult, RaincheckError> {
        let target = parse_target_date(request.date)?;
        let key = CacheKey::for_day(request.lat, request.lon, target.month(), target.day())?;

        let server_already_passed = target < now.date_naive();
        if let Some(client_flag) = request.already_passed {
            if client_flag != server_already_passed {
                warn!(
                    "Client already_passed={} disagrees with server={} for {}",
                    client_flag, server_already_passed, request.date
                );
            }
        }

        let ctx = RequestContext {
            request,
            key,
            target,
            now,
            server_already_passed,
        };

        // A failed read degrades to a miss: the cache is an accelerator, not
        // a source of truth.
        let cached = match self.store.get(&key).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Cache read failed for {}, treating as a miss: {}", key, e);
                None
            }
        };

        match cached {
            None => self.miss(&ctx).await,
            Some(entry) => {
                let staleness = check_staleness(&entry, target, now);
                if staleness.needs_update {
                    self.refresh(&ctx, entry, staleness.years_to_fetch).await
                } else {
                    self.fresh_hit(&ctx, entry).await
                }
            }
        }
    }

    /// MISS: no cached entry. Fetch the full history, compute everything,
    /// persist a new entry. Data source failures are fatal here since there
    /// is nothing to fall back to.
    async fn miss(&self, ctx: &RequestContext<'_>) -> Result<PredictionResult, RaincheckError> {
        let key = ctx.key;
        info!("Cache miss for {}, fetching full history", key);

        let series = self
            .history
            .day_history(ctx.request.lat, ctx.request.lon, key.month(), key.day(), None)
            .await?;

        let no_data = || RaincheckError::NoDataAvailable {
            lat: ctx.request.lat,
            lon: ctx.request.lon,
            month: key.month(),
            day: key.day(),
        };
        let Some(latest_year) = series.iter().map(|obs| obs.year).max() else {
            return Err(no_data());
        };
        let statistics = compute_statistics(&series).map_err(|_| no_data())?;

        let missing_years = missing_years_for_target(latest_year, ctx.target.year());
        let confidence = confidence_score(series.len(), missing_years.len());
        let alert = missing_data_alert(&missing_years, series.len(), ctx.now);
        let metadata = EntryMetadata::new(
            statistics.years_analyzed.clone(),
            series.len(),
            latest_year,
            missing_years,
            ctx.now,
        );

        let (ai_insight, verification) = tokio::join!(
            self.insight.generate(
                ctx.request.lat,
                ctx.request.lon,
                ctx.target,
                &statistics,
                confidence,
                alert.as_ref(),
                ctx.request.activity,
                ctx.request.part_of_day,
            ),
            self.verifier
                .verify(&statistics, ctx.request.lat, ctx.request.lon, ctx.target),
        );

        let entry = CacheEntry {
            cache_key: key.to_string(),
            location: StoredLocation {
                lat: ctx.request.lat,
                lon: ctx.request.lon,
            },
            target_date: format!("{:02}-{:02}", key.month(), key.day()),
            statistics: statistics.clone(),
            metadata,
            confidence_score: confidence,
            ai_insight: ai_insight.clone(),
            created_at: ctx.now,
        };
        if let Err(e) = self.store.put(&key, &entry).await {
            warn!("Failed to persist prediction entry {}: {}", key, e);
        }

        Ok(PredictionResult {
            query: ctx.echo(),
            statistics,
            confidence_score: confidence,
            cache_status: CacheStatus::Miss,
            server_already_passed: ctx.server_already_passed,
            missing_data_alert: alert,
            verification: Some(verification),
            ai_insight,
            warning: None,
        })
    }

    /// HIT_FRESH: the entry covers every elapsed year; return it as stored.
    async fn fresh_hit(
        &self,
        ctx: &RequestContext<'_>,
        entry: CacheEntry,
    ) -> Result<PredictionResult, RaincheckError> {
        info!("Cache hit for {}", ctx.key);

        let alert = missing_data_alert(
            &entry.metadata.missing_years,
            entry.metadata.total_years,
            ctx.now,
        );
        let ai_insight = self
            .ensure_insight(ctx, entry.ai_insight.clone(), &entry.statistics, entry.confidence_score, alert.as_ref())
            .await;
        let verification = self
            .verifier
            .verify(&entry.statistics, ctx.request.lat, ctx.request.lon, ctx.target)
            .await;

        Ok(PredictionResult {
            query: ctx.echo(),
            statistics: entry.statistics,
            confidence_score: entry.confidence_score,
            cache_status: CacheStatus::Hit,
            server_already_passed: ctx.server_already_passed,
            missing_data_alert: alert,
            verification: Some(verification),
            ai_insight,
            warning: None,
        })
    }

    /// HIT_STALE: newly elapsed years exist. Probe the source for exactly
    /// those years, then recompute over the complete refetched series (raw
    /// per-year samples are not persisted, only the derived aggregate, so an
    /// incremental update still recomputes from the full set). Any fetch
    /// failure falls back to the stale entry with a warning.
    async fn refresh(
        &self,
        ctx: &RequestContext<'_>,
        entry: CacheEntry,
        years_to_fetch: Vec<i32>,
    ) -> Result<PredictionResult, RaincheckError> {
        let key = ctx.key;
        info!(
            "Cache entry {} is stale, fetching {} new year(s): {:?}",
            key,
            years_to_fetch.len(),
            years_to_fetch
        );

        let incremental = self
            .history
            .day_history(
                ctx.request.lat,
                ctx.request.lon,
                key.month(),
                key.day(),
                Some(&years_to_fetch),
            )
            .await;
        let new_observations = match incremental {
            Ok(observations) => observations,
            Err(e) => return Ok(self.stale_fallback(ctx, entry, e.to_string()).await),
        };
        if new_observations.is_empty() {
            info!(
                "Source has not published {:?} yet for {}; recomputing anyway",
                years_to_fetch, key
            );
        }

        let series = match self
            .history
            .day_history(ctx.request.lat, ctx.request.lon, key.month(), key.day(), None)
            .await
        {
            Ok(series) => series,
            Err(e) => return Ok(self.stale_fallback(ctx, entry, e.to_string()).await),
        };

        let Some(latest_year) = series.iter().map(|obs| obs.year).max() else {
            return Ok(self
                .stale_fallback(ctx, entry, "the source returned no observations".to_string())
                .await);
        };
        let Ok(statistics) = compute_statistics(&series) else {
            return Ok(self
                .stale_fallback(ctx, entry, "the source returned no observations".to_string())
                .await);
        };

        let missing_years = missing_years_for_target(latest_year, ctx.target.year());
        let confidence = confidence_score(series.len(), missing_years.len());
        let alert = missing_data_alert(&missing_years, series.len(), ctx.now);
        let metadata = EntryMetadata::new(
            statistics.years_analyzed.clone(),
            series.len(),
            latest_year,
            missing_years,
            ctx.now,
        );

        let patch = EntryPatch::refresh(statistics.clone(), metadata, confidence);
        if let Err(e) = self.store.update(&key, patch).await {
            warn!("Failed to persist refreshed entry {}: {}", key, e);
        }
        info!(
            "Updated cache entry {}, data now complete through {}",
            key, latest_year
        );

        let ai_insight = self
            .ensure_insight(ctx, entry.ai_insight.clone(), &statistics, confidence, alert.as_ref())
            .await;
        let verification = self
            .verifier
            .verify(&statistics, ctx.request.lat, ctx.request.lon, ctx.target)
            .await;

        Ok(PredictionResult {
            query: ctx.echo(),
            statistics,
            confidence_score: confidence,
            cache_status: CacheStatus::Updated,
            server_already_passed: ctx.server_already_passed,
            missing_data_alert: alert,
            verification: Some(verification),
            ai_insight,
            warning: None,
        })
    }

    /// The recovered failure: the refresh could not complete, so the
    /// last-known-good entry is returned with an explicit warning.
    async fn stale_fallback(
        &self,
        ctx: &RequestContext<'_>,
        entry: CacheEntry,
        reason: String,
    ) -> PredictionResult {
        warn!(
            "Incremental refresh failed for {}, serving stale cache: {}",
            ctx.key, reason
        );

        let alert = missing_data_alert(
            &entry.metadata.missing_years,
            entry.metadata.total_years,
            ctx.now,
        );
        let verification = self
            .verifier
            .verify(&entry.statistics, ctx.request.lat, ctx.request.lon, ctx.target)
            .await;
        let warning = format!(
            "Could not refresh with the newest years ({}); returning the last complete \
             analysis covering {}.",
            reason, entry.metadata.years_analyzed
        );

        PredictionResult {
            query: ctx.echo(),
            statistics: entry.statistics,
            confidence_score: entry.confidence_score,
            cache_status: CacheStatus::HitStale,
            server_already_passed: ctx.server_already_passed,
            missing_data_alert: alert,
            verification: Some(verification),
            ai_insight: entry.ai_insight,
            warning: Some(warning),
        }
    }

    /// Reuses a stored insight, or generates one and patches it into the
    /// store when the agent is enabled. The patch is best-effort.
    async fn ensure_insight(
        &self,
        ctx: &RequestContext<'_>,
        existing: Option<AiInsight>,
        statistics: &DayStatistics,
        confidence: f64,
        alert: Option<&MissingDataAlert>,
    ) -> Option<AiInsight> {
        if existing.is_some() {
            return existing;
        }
        if !self.insight.enabled() {
            return None;
        }

        let generated = self
            .insight
            .generate(
                ctx.request.lat,
                ctx.request.lon,
                ctx.target,
                statistics,
                confidence,
                alert,
                ctx.request.activity,
                ctx.request.part_of_day,
            )
            .await;
        if let Some(insight) = &generated {
            if let Err(e) = self
                .store
                .update(&ctx.key, EntryPatch::insight(insight.clone()))
                .await
            {
                warn!("Failed to attach insight to cache entry {}: {}", ctx.key, e);
            }
        }
        generated
    }
}
