//! The reasoning agent: turns a statistical prediction into a short,
//! conversational recommendation. Pure enrichment, never on the critical
//! path: a disabled agent or a failed generation yields `None` and the
//! prediction proceeds without it.

use crate::cache::advisory::MissingDataAlert;
use crate::insight::gemini::GeminiClient;
use crate::types::enrichment::AiInsight;
use crate::types::statistics::DayStatistics;
use chrono::{Datelike, NaiveDate, Utc};
use log::warn;
use std::sync::Arc;

pub struct InsightAgent {
    client: Option<Arc<GeminiClient>>,
    model: String,
}

impl InsightAgent {
    pub(crate) fn new(client: Option<Arc<GeminiClient>>, model: String) -> Self {
        Self { client, model }
    }

    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Generates an insight for a prediction, or `None` when the agent is
    /// disabled or generation fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate(
        &self,
        lat: f64,
        lon: f64,
        target: NaiveDate,
        statistics: &DayStatistics,
        confidence_score: f64,
        alert: Option<&MissingDataAlert>,
        activity: Option<&str>,
        part_of_day: Option<&str>,
    ) -> Option<AiInsight> {
        let client = self.client.as_ref()?;
        let prompt = build_prompt(
            lat,
            lon,
            target,
            statistics,
            confidence_score,
            alert,
            activity,
            part_of_day,
        );

        match client.generate(&self.model, &prompt).await {
            Ok(reasoning) => Some(AiInsight {
                reasoning,
                generated_by: self.model.clone(),
                generated_at: Utc::now(),
            }),
            Err(e) => {
                warn!("Failed to generate AI insight: {}", e);
                None
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_prompt(
    lat: f64,
    lon: f64,
    target: NaiveDate,
    statistics: &DayStatistics,
    confidence_score: f64,
    alert: Option<&MissingDataAlert>,
    activity: Option<&str>,
    part_of_day: Option<&str>,
) -> String {
    let month_name = target.format("%B");
    let day = target.day();

    let missing_context = alert
        .map(|alert| {
            format!(
                "\nNote: {} year(s) of data are unavailable ({}). The prediction leans on \
                 historical patterns and actual conditions may vary.\n",
                alert.missing_years_count,
                alert
                    .missing_years
                    .iter()
                    .map(|y| y.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
        .unwrap_or_default();

    let activity_line = activity
        .map(|a| format!("**Planned activity**: {}\n", a))
        .unwrap_or_default();
    let part_of_day_line = part_of_day
        .map(|p| format!("**Part of day**: {}\n", p))
        .unwrap_or_default();

    format!(
        "You are a friendly and knowledgeable weather assistant helping someone plan their day.\n\
         \n\
         **Location**: Latitude {lat}, Longitude {lon}\n\
         **Date**: {month_name} {day}\n\
         **Historical data**: {data_years} years of weather records\n\
         {activity_line}{part_of_day_line}\
         \n\
         **Weather statistics:**\n\
         - Precipitation probability: {rain_prob:.1}%\n\
         - Average rainfall: {avg_precip:.1} mm\n\
         - Temperature range: {min_temp:.1}\u{b0}C to {max_temp:.1}\u{b0}C (avg: {avg_temp:.1}\u{b0}C)\n\
         - Wind speed: {wind:.1} m/s\n\
         - Humidity: {humidity:.1}%\n\
         - Prediction confidence: {confidence:.0}%\n\
         {missing_context}\
         \n\
         **Your task:**\n\
         Provide a natural, conversational weather insight in 3-4 sentences that includes:\n\
         1. Rain likelihood in simple terms (e.g. \"unlikely to rain\", \"high chance of showers\")\n\
         2. A temperature description (e.g. \"pleasant weather\", \"hot day\", \"cool evening\")\n\
         3. A practical recommendation for the day (clothing, activities, precautions)\n\
         4. A friendly mention of where these coordinates are.\n\
         Keep it concise and actionable, and speak directly to the user.",
        lat = lat,
        lon = lon,
        month_name = month_name,
        day = day,
        data_years = statistics.data_years_count,
        activity_line = activity_line,
        part_of_day_line = part_of_day_line,
        rain_prob = statistics.precipitation_probability_percent,
        avg_precip = statistics.average_precipitation_mm,
        min_temp = statistics.min_temperature_celsius,
        max_temp = statistics.max_temperature_celsius,
        avg_temp = statistics.average_temperature_celsius,
        wind = statistics.average_wind_speed_mps,
        humidity = statistics.average_humidity_percent,
        confidence = confidence_score * 100.0,
        missing_context = missing_context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::advisory::missing_data_alert;
    use crate::insight::gemini::DEFAULT_INSIGHT_MODEL;
    use chrono::TimeZone;

    fn sample_statistics() -> DayStatistics {
        DayStatistics {
            data_years_count: 44,
            years_analyzed: "1981-2024".to_string(),
            precipitation_probability_percent: 31.82,
            average_precipitation_mm: 2.4,
            average_temperature_celsius: 24.1,
            max_temperature_celsius: 33.0,
            min_temperature_celsius: 16.2,
            average_wind_speed_mps: 2.9,
            average_humidity_percent: 71.0,
        }
    }

    #[tokio::test]
    async fn disabled_agent_yields_no_insight() {
        let agent = InsightAgent::new(None, DEFAULT_INSIGHT_MODEL.to_string());
        assert!(!agent.enabled());
        let target = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let insight = agent
            .generate(12.97, 77.59, target, &sample_statistics(), 1.0, None, None, None)
            .await;
        assert!(insight.is_none());
    }

    #[test]
    fn prompt_carries_the_statistics_and_optional_context() {
        let target = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        let alert = missing_data_alert(&[2025], 44, now);

        let prompt = build_prompt(
            12.97,
            77.59,
            target,
            &sample_statistics(),
            0.98,
            alert.as_ref(),
            Some("picnic"),
            Some("morning"),
        );

        assert!(prompt.contains("June 15"));
        assert!(prompt.contains("44 years"));
        assert!(prompt.contains("picnic"));
        assert!(prompt.contains("morning"));
        assert!(prompt.contains("1 year(s) of data are unavailable (2025)"));
    }

    #[test]
    fn prompt_omits_absent_optional_context() {
        let target = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let prompt = build_prompt(12.97, 77.59, target, &sample_statistics(), 1.0, None, None, None);
        assert!(!prompt.contains("Planned activity"));
        assert!(!prompt.contains("Part of day"));
        assert!(!prompt.contains("Note:"));
    }
}
