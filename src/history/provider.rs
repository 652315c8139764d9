use crate::history::error::HistoryError;
use crate::types::observation::DayObservation;
use async_trait::async_trait;

/// Source of historical calendar-day observations.
///
/// Implementations return one [`DayObservation`] per year for which the
/// source has data, ascending by year. An empty series means the source has
/// nothing for these coordinates; that is not an error. Transport and
/// format failures surface as [`HistoryError`].
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetches observations for the given month/day across years.
    ///
    /// When `years` is `None`, the provider's full supported range is
    /// fetched; otherwise only the listed years are requested (the
    /// incremental-refresh contract).
    async fn day_history(
        &self,
        lat: f64,
        lon: f64,
        month: u32,
        day: u32,
        years: Option<&[i32]>,
    ) -> Result<Vec<DayObservation>, HistoryError>;
}
