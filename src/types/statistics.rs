use serde::{Deserialize, Serialize};

/// Aggregate statistics for one calendar-day bucket, derived from the full
/// set of per-year observations. This is the unit that gets cached; all
/// values are rounded to two decimals.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DayStatistics {
    /// Number of distinct years that contributed a sample.
    pub data_years_count: usize,
    /// Inclusive year span of the analyzed samples, e.g. `"1981-2024"`.
    pub years_analyzed: String,
    /// Share of analyzed years whose precipitation exceeded the rain threshold.
    pub precipitation_probability_percent: f64,
    pub average_precipitation_mm: f64,
    pub average_temperature_celsius: f64,
    pub max_temperature_celsius: f64,
    pub min_temperature_celsius: f64,
    pub average_wind_speed_mps: f64,
    pub average_humidity_percent: f64,
}
