//! Historical-data source backed by the NASA POWER daily point API.
//!
//! One calendar-day bucket is assembled from one request per year
//! (`start == end == the target day`), which is also what lets the cache ask
//! for an explicit year subset during an incremental refresh.

use crate::history::error::HistoryError;
use crate::history::provider::HistoryProvider;
use crate::types::observation::DayObservation;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

const POWER_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
const POWER_PARAMETERS: &str = "T2M,T2M_MAX,T2M_MIN,PRECTOTCORR,WS2M,RH2M";
const POWER_COMMUNITY: &str = "RE";
/// First year with full daily coverage for the requested parameters.
const POWER_START_YEAR: i32 = 1981;
/// POWER reports gaps with this fill value.
const POWER_FILL_VALUE: f64 = -999.0;
const MAX_CONCURRENT_YEAR_REQUESTS: usize = 8;

/// POWER daily point response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    /// Parameter name -> (YYYYMMDD -> value).
    parameter: HashMap<String, HashMap<String, f64>>,
}

/// [`HistoryProvider`] implementation talking to the NASA POWER API.
pub struct PowerClient {
    client: Client,
}

impl PowerClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn fetch_year(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> Result<Option<DayObservation>, HistoryError> {
        let stamp = date.format("%Y%m%d").to_string();
        let url = format!(
            "{}?parameters={}&community={}&latitude={}&longitude={}&start={}&end={}&format=JSON",
            POWER_BASE_URL, POWER_PARAMETERS, POWER_COMMUNITY, lat, lon, stamp, stamp
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HistoryError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    HistoryError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    HistoryError::NetworkRequest(url, e)
                });
            }
        };

        let body: PowerResponse = response
            .json()
            .await
            .map_err(|e| HistoryError::Decode(url, e))?;

        let observation = Self::observation_from(&body, date);
        if observation.is_none() {
            debug!("No usable POWER data for ({}, {}) on {}", lat, lon, stamp);
        }
        Ok(observation)
    }

    /// Extracts a single-year observation from a POWER response, or `None`
    /// when any parameter is absent or carries the fill value.
    fn observation_from(body: &PowerResponse, date: NaiveDate) -> Option<DayObservation> {
        let stamp = date.format("%Y%m%d").to_string();
        let value = |parameter: &str| -> Option<f64> {
            let v = *body.properties.parameter.get(parameter)?.get(&stamp)?;
            if v == POWER_FILL_VALUE {
                None
            } else {
                Some(v)
            }
        };

        Some(DayObservation {
            year: date.year(),
            precipitation_mm: value("PRECTOTCORR")?,
            temperature_celsius: value("T2M")?,
            max_temperature_celsius: value("T2M_MAX")?,
            min_temperature_celsius: value("T2M_MIN")?,
            wind_speed_mps: value("WS2M")?,
            humidity_percent: value("RH2M")?,
        })
    }
}

impl Default for PowerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryProvider for PowerClient {
    async fn day_history(
        &self,
        lat: f64,
        lon: f64,
        month: u32,
        day: u32,
        years: Option<&[i32]>,
    ) -> Result<Vec<DayObservation>, HistoryError> {
        let candidate_years: Vec<i32> = match years {
            Some(list) => list.to_vec(),
            None => (POWER_START_YEAR..=Utc::now().year()).collect(),
        };

        // A Feb 29 target simply has no instance in non-leap years.
        let dates: Vec<NaiveDate> = candidate_years
            .into_iter()
            .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
            .collect();

        info!(
            "Fetching {} year(s) of history for ({}, {}) on {:02}-{:02}",
            dates.len(),
            lat,
            lon,
            month,
            day
        );

        let fetched: Vec<Option<DayObservation>> =
            stream::iter(dates.into_iter().map(|date| self.fetch_year(lat, lon, date)))
                .buffer_unordered(MAX_CONCURRENT_YEAR_REQUESTS)
                .try_collect()
                .await?;

        let mut observations: Vec<DayObservation> = fetched.into_iter().flatten().collect();
        observations.sort_by_key(|obs| obs.year);
        Ok(observations)
    }
}
