//! Staleness detection: decides whether a cached entry must be refreshed
//! with newly elapsed calendar years, and enumerates exactly which ones.

use crate::cache::entry::CacheEntry;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

/// The refresh decision for one cached entry against one target date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessCheck {
    pub needs_update: bool,
    /// Newly elapsed years to request from the data source, ascending.
    pub years_to_fetch: Vec<i32>,
}

/// Walks the years between the entry's latest analyzed year and the current
/// year, collecting every year whose instance of the target month/day has
/// already passed.
///
/// A year is included only when the calendar date `(year, month, day)` lies
/// strictly in the past relative to `now`; a year whose instance of the
/// target day has not happened yet is not fetchable (e.g. asking for Dec 31
/// data in February). Feb 29 targets skip years in which that date does not
/// exist, rather than failing.
///
/// Pure and idempotent: re-running against the same entry and instant
/// yields the same answer.
pub fn check_staleness(entry: &CacheEntry, target: NaiveDate, now: DateTime<Utc>) -> StalenessCheck {
    let latest = entry.metadata.latest_available_year;
    let mut years_to_fetch = Vec::new();

    for year in latest + 1..=now.year() {
        let Some(candidate) = NaiveDate::from_ymd_opt(year, target.month(), target.day()) else {
            continue;
        };
        if candidate.and_time(NaiveTime::MIN).and_utc() < now {
            years_to_fetch.push(year);
        }
    }

    StalenessCheck {
        needs_update: !years_to_fetch.is_empty(),
        years_to_fetch,
    }
}
