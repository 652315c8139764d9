use serde::{Deserialize, Serialize};

/// One historical sample for a calendar-day bucket: the conditions observed
/// at the queried point on this month/day in one specific year.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DayObservation {
    pub year: i32,                    // calendar year of the sample
    pub precipitation_mm: f64,        // PRECTOTCORR (mm/day)
    pub temperature_celsius: f64,     // T2M (daily mean)
    pub max_temperature_celsius: f64, // T2M_MAX
    pub min_temperature_celsius: f64, // T2M_MIN
    pub wind_speed_mps: f64,          // WS2M (daily mean)
    pub humidity_percent: f64,        // RH2M (daily mean)
}
