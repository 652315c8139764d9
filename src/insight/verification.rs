//! The verification agent: a second-opinion pass that judges whether the
//! computed statistics are physically plausible for the location and date.
//! Like the reasoning agent it can only degrade, never fail: no configured
//! model yields a `skipped` payload, an uninterpretable answer yields
//! `unverified`.

use crate::insight::gemini::GeminiClient;
use crate::types::enrichment::{Verification, VerificationStatus};
use crate::types::statistics::DayStatistics;
use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;
use std::sync::Arc;

pub struct VerificationAgent {
    client: Option<Arc<GeminiClient>>,
    model: String,
}

impl VerificationAgent {
    pub(crate) fn new(client: Option<Arc<GeminiClient>>, model: String) -> Self {
        Self { client, model }
    }

    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Verifies a statistics payload. Always returns a payload.
    pub async fn verify(
        &self,
        statistics: &DayStatistics,
        lat: f64,
        lon: f64,
        target: NaiveDate,
    ) -> Verification {
        let Some(client) = self.client.as_ref() else {
            return Verification::skipped();
        };

        let prompt = build_prompt(statistics, lat, lon, target);
        match client.generate(&self.model, &prompt).await {
            Ok(text) => parse_verification(&text, &self.model),
            Err(e) => {
                warn!("Statistic verification unavailable: {}", e);
                Verification::unverified(format!("Verification unavailable: {}", e), &self.model)
            }
        }
    }
}

fn build_prompt(statistics: &DayStatistics, lat: f64, lon: f64, target: NaiveDate) -> String {
    format!(
        "You are a meteorological data validator with expertise in climatology.\n\
         \n\
         **Task**: verify whether these statistics are reasonable and flag anomalies.\n\
         \n\
         **Location**: latitude {lat}, longitude {lon}\n\
         **Date**: {target}\n\
         **Data years**: {years} ({span})\n\
         \n\
         **Statistics to verify:**\n\
         - Rain probability: {rain_prob}%\n\
         - Average precipitation: {avg_precip} mm/day\n\
         - Average temperature: {avg_temp}\u{b0}C\n\
         - Max temperature: {max_temp}\u{b0}C\n\
         - Min temperature: {min_temp}\u{b0}C\n\
         - Wind speed: {wind} m/s\n\
         - Humidity: {humidity}%\n\
         \n\
         **Criteria:**\n\
         1. Values within physically possible ranges (temperature -50..60\u{b0}C, humidity \
         0..100%, wind 0..100 m/s, precipitation 0..500 mm/day, probability 0..100%).\n\
         2. Values plausible for this latitude/longitude and season.\n\
         3. Internal consistency (max >= min temperature; humidity and rain correlate).\n\
         \n\
         Respond with EXACTLY this JSON, nothing else:\n\
         {{\n\
           \"is_valid\": true,\n\
           \"confidence\": \"high|medium|low\",\n\
           \"anomalies\": [\"...\"],\n\
           \"validation_notes\": \"...\"\n\
         }}\n\
         Be strict but reasonable: historical climate data, not real-time weather. Only mark \
         invalid for serious errors or impossible values.",
        lat = lat,
        lon = lon,
        target = target,
        years = statistics.data_years_count,
        span = statistics.years_analyzed,
        rain_prob = statistics.precipitation_probability_percent,
        avg_precip = statistics.average_precipitation_mm,
        avg_temp = statistics.average_temperature_celsius,
        max_temp = statistics.max_temperature_celsius,
        min_temp = statistics.min_temperature_celsius,
        wind = statistics.average_wind_speed_mps,
        humidity = statistics.average_humidity_percent,
    )
}

#[derive(Debug, Deserialize)]
struct RawVerification {
    #[serde(default = "default_valid")]
    is_valid: bool,
    #[serde(default = "default_confidence")]
    confidence: String,
    #[serde(default)]
    anomalies: Vec<String>,
    #[serde(default)]
    validation_notes: String,
}

fn default_valid() -> bool {
    true
}

fn default_confidence() -> String {
    "medium".to_string()
}

/// Interprets the model's answer. Models occasionally wrap the JSON in
/// markdown fences or prose, so the parser slices out the outermost object
/// before decoding; anything that still fails becomes `unverified`.
fn parse_verification(text: &str, model: &str) -> Verification {
    let parsed: Option<RawVerification> = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&text[start..=end]).ok(),
        _ => None,
    };

    match parsed {
        Some(raw) => Verification {
            status: if raw.is_valid {
                VerificationStatus::Verified
            } else {
                VerificationStatus::Invalid
            },
            is_valid: raw.is_valid,
            confidence: raw.confidence,
            anomalies: raw.anomalies,
            validation_notes: raw.validation_notes,
            verified_by: model.to_string(),
        },
        None => {
            let snippet: String = text.chars().take(200).collect();
            Verification::unverified(snippet, model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::gemini::DEFAULT_VERIFICATION_MODEL;

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
    async fn disabled_agent_returns_the_skipped_payload() {
        let agent = VerificationAgent::new(None, DEFAULT_VERIFICATION_MODEL.to_string());
        let target = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let verification = agent.verify(&sample_statistics(), 12.97, 77.59, target).await;
        assert_eq!(verification.status, VerificationStatus::Skipped);
        assert!(verification.is_valid);
        assert_eq!(verification.verified_by, "programmatic");
    }

    #[test]
    fn clean_json_parses_as_verified() {
        let text = r#"{"is_valid": true, "confidence": "high", "anomalies": [], "validation_notes": "Looks plausible."}"#;
        let verification = parse_verification(text, "test-model");
        assert_eq!(verification.status, VerificationStatus::Verified);
        assert_eq!(verification.confidence, "high");
        assert_eq!(verification.verified_by, "test-model");
    }

    #[test]
    fn fenced_json_still_parses() {
        let text = "```json\n{\"is_valid\": false, \"confidence\": \"medium\", \"anomalies\": [\"min above max\"], \"validation_notes\": \"Inconsistent temperatures\"}\n```";
        let verification = parse_verification(text, "test-model");
        assert_eq!(verification.status, VerificationStatus::Invalid);
        assert!(!verification.is_valid);
        assert_eq!(verification.anomalies, vec!["min above max".to_string()]);
    }

    #[test]
    fn prose_wrapped_json_still_parses() {
        let text = "Sure! Here is my assessment: {\"is_valid\": true, \"confidence\": \"low\"} Hope that helps.";
        let verification = parse_verification(text, "test-model");
        assert_eq!(verification.status, VerificationStatus::Verified);
        assert_eq!(verification.confidence, "low");
    }

    #[test]
    fn uninterpretable_answers_degrade_to_unverified() {
        let verification = parse_verification("The data seems fine to me.", "test-model");
        assert_eq!(verification.status, VerificationStatus::Unverified);
        assert!(verification.is_valid);
    }
}
