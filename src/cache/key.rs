//! Cache key derivation: maps a (latitude, longitude, date) query to the
//! stable identity of its calendar-day bucket.

use crate::error::RaincheckError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one cached prediction: coordinates rounded to two decimal
/// places plus the calendar day (month/day, year-independent).
///
/// The rounding collapses coordinates within roughly 1.1 km into one bucket.
/// That is a deliberate precision/cost tradeoff: climatology does not vary
/// meaningfully at that scale, and the collapse lets nearby queries share
/// one cache entry. Rounded coordinates are stored as integers scaled by
/// 100 so that equality and hashing stay exact.
///
/// # Examples
///
/// ```
/// use raincheck::CacheKey;
///
/// let key = CacheKey::derive(12.9716, 77.5946, "2025-06-15").unwrap();
/// assert_eq!(key.to_string(), "12.97_77.59_06-15");
///
/// // Nearby coordinates share the bucket.
/// let nearby = CacheKey::derive(12.9731, 77.5929, "2031-06-15").unwrap();
/// assert_eq!(key, nearby);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    lat_e2: i32,
    lon_e2: i32,
    month: u32,
    day: u32,
}

impl CacheKey {
    /// Derives the cache key for a query.
    ///
    /// # Errors
    ///
    /// Returns [`RaincheckError::InvalidLatitude`], [`RaincheckError::InvalidLongitude`]
    /// or [`RaincheckError::InvalidDate`] when the inputs are out of range or
    /// the date does not parse as `YYYY-MM-DD`.
    pub fn derive(lat: f64, lon: f64, date: &str) -> Result<Self, RaincheckError> {
        let target = parse_target_date(date)?;
        Self::for_day(lat, lon, target.month(), target.day())
    }

    pub(crate) fn for_day(lat: f64, lon: f64, month: u32, day: u32) -> Result<Self, RaincheckError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(RaincheckError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(RaincheckError::InvalidLongitude(lon));
        }
        Ok(Self {
            lat_e2: (lat * 100.0).round() as i32,
            lon_e2: (lon * 100.0).round() as i32,
            month,
            day,
        })
    }

    /// Center latitude of the coordinate bucket.
    pub fn lat(&self) -> f64 {
        self.lat_e2 as f64 / 100.0
    }

    /// Center longitude of the coordinate bucket.
    pub fn lon(&self) -> f64 {
        self.lon_e2 as f64 / 100.0
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

/// Formats the key in its canonical persisted form, `"12.97_77.59_06-15"`.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}_{:.2}_{:02}-{:02}",
            self.lat(),
            self.lon(),
            self.month,
            self.day
        )
    }
}

pub(crate) fn parse_target_date(date: &str) -> Result<NaiveDate, RaincheckError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| RaincheckError::InvalidDate(date.to_string(), e))
}
