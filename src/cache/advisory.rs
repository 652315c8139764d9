//! Missing-data disclosure: a deterministic, structured explanation of which
//! years could not be included in an analysis and why that is acceptable.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// How concerning the data gap is, by the number of missing years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// At most one missing year.
    Low,
    /// Two or three missing years.
    Moderate,
    /// Four or more missing years.
    High,
}

/// Structured disclosure of the years a prediction could not include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingDataAlert {
    pub missing_years_count: usize,
    pub missing_years: Vec<i32>,
    /// Missing years that have not occurred yet.
    pub future_years: Vec<i32>,
    /// Missing years that have elapsed but whose data the source has not
    /// published yet.
    pub past_years: Vec<i32>,
    pub message: String,
    pub severity: Severity,
}

/// Enumerates the years a query leaves uncovered: everything strictly after
/// the latest analyzed year, up to and including the target year.
pub fn missing_years_for_target(latest_available_year: i32, target_year: i32) -> Vec<i32> {
    (latest_available_year + 1..=target_year).collect()
}

/// Builds the disclosure for a set of missing years, or `None` when nothing
/// is missing.
///
/// The message framing depends on where the gap sits relative to `now`:
/// years that have not occurred yet read as a future prediction, elapsed
/// years read as not-yet-published source data, and a mix gets a generic
/// incompleteness framing.
pub fn missing_data_alert(
    missing_years: &[i32],
    total_years: usize,
    now: DateTime<Utc>,
) -> Option<MissingDataAlert> {
    if missing_years.is_empty() {
        return None;
    }

    let current_year = now.year();
    let future_years: Vec<i32> = missing_years.iter().copied().filter(|&y| y > current_year).collect();
    let past_years: Vec<i32> = missing_years.iter().copied().filter(|&y| y <= current_year).collect();

    let count = missing_years.len();
    let years_list = missing_years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let message = if past_years.is_empty() {
        format!(
            "Data for {} year(s) ({}) is not available because these years have not occurred yet. \
             This is a future prediction built from {} years of historical patterns.",
            count, years_list, total_years
        )
    } else if future_years.is_empty() {
        format!(
            "Data for {} year(s) ({}) has not been published by the data source yet. \
             Analysis is based on {} years of historical data; recent years may be published soon.",
            count, years_list, total_years
        )
    } else {
        format!(
            "Data for {} year(s) ({}) is not available. Analysis is based on {} years of \
             historical data and will improve as more data becomes available.",
            count, years_list, total_years
        )
    };

    let severity = if count <= 1 {
        Severity::Low
    } else if count <= 3 {
        Severity::Moderate
    } else {
        Severity::High
    };

    Some(MissingDataAlert {
        missing_years_count: count,
        missing_years: missing_years.to_vec(),
        future_years,
        past_years,
        message,
        severity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_missing_years_means_no_alert() {
        assert!(missing_data_alert(&[], 40, fixed_now()).is_none());
    }

    #[test]
    fn missing_year_range_is_inclusive_of_the_target() {
        assert_eq!(missing_years_for_target(2024, 2026), vec![2025, 2026]);
        assert_eq!(missing_years_for_target(2024, 2024), Vec::<i32>::new());
        assert_eq!(missing_years_for_target(2024, 2020), Vec::<i32>::new());
    }

    #[test]
    fn severity_thresholds() {
        let cases = [
            (vec![2026], Severity::Low),
            (vec![2026, 2027], Severity::Moderate),
            (vec![2026, 2027, 2028], Severity::Moderate),
            (vec![2026, 2027, 2028, 2029], Severity::High),
        ];
        for (years, expected) in cases {
            let alert = missing_data_alert(&years, 40, fixed_now()).unwrap();
            assert_eq!(alert.severity, expected, "for {:?}", years);
        }
    }

    #[test]
    fn all_future_years_read_as_a_future_prediction() {
        let alert = missing_data_alert(&[2026, 2027], 44, fixed_now()).unwrap();
        assert_eq!(alert.future_years, vec![2026, 2027]);
        assert!(alert.past_years.is_empty());
        assert!(alert.message.contains("have not occurred yet"));
        assert!(alert.message.contains("2026, 2027"));
        assert!(alert.message.contains("44 years"));
    }

    #[test]
    fn all_past_years_read_as_unpublished_source_data() {
        let alert = missing_data_alert(&[2024, 2025], 43, fixed_now()).unwrap();
        assert_eq!(alert.past_years, vec![2024, 2025]);
        assert!(alert.future_years.is_empty());
        assert!(alert.message.contains("has not been published"));
    }

    #[test]
    fn mixed_years_get_the_generic_framing() {
        let alert = missing_data_alert(&[2025, 2026], 44, fixed_now()).unwrap();
        assert_eq!(alert.past_years, vec![2025]);
        assert_eq!(alert.future_years, vec![2026]);
        assert!(alert.message.contains("is not available."));
    }
}
