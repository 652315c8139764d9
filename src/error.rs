use crate::history::error::HistoryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RaincheckError {
    #[error("Latitude {0} is outside the valid range [-90, 90]")]
    InvalidLatitude(f64),

    #[error("Longitude {0} is outside the valid range [-180, 180]")]
    InvalidLongitude(f64),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String, #[source] chrono::ParseError),

    #[error("No historical data available for ({lat}, {lon}) on {month:02}-{day:02}")]
    NoDataAvailable {
        lat: f64,
        lon: f64,
        month: u32,
        day: u32,
    },

    #[error(transparent)]
    DataSource(#[from] HistoryError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,
}
