//! Aggregates per-year calendar-day observations into summary statistics.
//!
//! This is a pure function over the full accumulated series: incremental
//! cache refreshes re-run it over the complete set of observations rather
//! than merging deltas into the previous aggregate.

use crate::types::observation::DayObservation;
use crate::types::statistics::DayStatistics;
use thiserror::Error;

/// Precipitation above this many mm/day counts the year as a rainy one.
pub const RAIN_THRESHOLD_MM_DAY: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("No observations to aggregate")]
pub struct EmptySeries;

/// Computes the calendar-day statistics for a series of yearly observations.
///
/// Returns [`EmptySeries`] when the series is empty; callers on the miss
/// path map that to "no data available" for these coordinates.
pub fn compute_statistics(series: &[DayObservation]) -> Result<DayStatistics, EmptySeries> {
    if series.is_empty() {
        return Err(EmptySeries);
    }
    let count = series.len();
    let n = count as f64;

    let rainy_years = series
        .iter()
        .filter(|obs| obs.precipitation_mm > RAIN_THRESHOLD_MM_DAY)
        .count();
    let rain_probability = rainy_years as f64 / n * 100.0;

    let mut first_year = series[0].year;
    let mut last_year = series[0].year;
    let mut precip_sum = 0.0;
    let mut temp_sum = 0.0;
    let mut wind_sum = 0.0;
    let mut humidity_sum = 0.0;
    let mut max_temp = f64::NEG_INFINITY;
    let mut min_temp = f64::INFINITY;
    for obs in series {
        first_year = first_year.min(obs.year);
        last_year = last_year.max(obs.year);
        precip_sum += obs.precipitation_mm;
        temp_sum += obs.temperature_celsius;
        wind_sum += obs.wind_speed_mps;
        humidity_sum += obs.humidity_percent;
        max_temp = max_temp.max(obs.max_temperature_celsius);
        min_temp = min_temp.min(obs.min_temperature_celsius);
    }

    Ok(DayStatistics {
        data_years_count: count,
        years_analyzed: format!("{}-{}", first_year, last_year),
        precipitation_probability_percent: round2(rain_probability),
        average_precipitation_mm: round2(precip_sum / n),
        average_temperature_celsius: round2(temp_sum / n),
        max_temperature_celsius: round2(max_temp),
        min_temperature_celsius: round2(min_temp),
        average_wind_speed_mps: round2(wind_sum / n),
        average_humidity_percent: round2(humidity_sum / n),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(year: i32, precipitation_mm: f64, temperature_celsius: f64) -> DayObservation {
        DayObservation {
            year,
            precipitation_mm,
            temperature_celsius,
            max_temperature_celsius: temperature_celsius + 5.0,
            min_temperature_celsius: temperature_celsius - 5.0,
            wind_speed_mps: 3.0,
            humidity_percent: 60.0,
        }
    }

    #[test]
    fn empty_series_is_an_error() {
        assert_eq!(compute_statistics(&[]), Err(EmptySeries));
    }

    #[test]
    fn rain_probability_counts_years_above_threshold() {
        // 1.0 mm sits exactly on the threshold and must not count as rain.
        let series = vec![
            obs(2020, 0.0, 20.0),
            obs(2021, 1.0, 20.0),
            obs(2022, 1.1, 20.0),
            obs(2023, 12.5, 20.0),
        ];
        let stats = compute_statistics(&series).unwrap();
        assert_eq!(stats.precipitation_probability_percent, 50.0);
        assert_eq!(stats.data_years_count, 4);
    }

    #[test]
    fn aggregates_cover_the_full_year_span() {
        let series = vec![obs(1985, 2.0, 18.0), obs(2010, 0.0, 26.0), obs(1999, 4.0, 22.0)];
        let stats = compute_statistics(&series).unwrap();
        assert_eq!(stats.years_analyzed, "1985-2010");
        assert_eq!(stats.average_temperature_celsius, 22.0);
        assert_eq!(stats.average_precipitation_mm, 2.0);
        assert_eq!(stats.max_temperature_celsius, 31.0);
        assert_eq!(stats.min_temperature_celsius, 13.0);
        assert_eq!(stats.average_wind_speed_mps, 3.0);
        assert_eq!(stats.average_humidity_percent, 60.0);
    }

    #[test]
    fn values_are_rounded_to_two_decimals() {
        let series = vec![obs(2020, 1.234, 20.111), obs(2021, 2.345, 21.222), obs(2022, 0.0, 19.333)];
        let stats = compute_statistics(&series).unwrap();
        assert_eq!(stats.average_precipitation_mm, 1.19);
        assert_eq!(stats.average_temperature_celsius, 20.22);
        assert_eq!(stats.precipitation_probability_percent, 66.67);
    }
}
