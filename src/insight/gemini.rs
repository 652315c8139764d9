//! Minimal Gemini REST client shared by the reasoning and verification
//! agents. Kept internal: the agents are the public surface, and both treat
//! every error here as a reason to degrade rather than fail.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_MS: u64 = 20_000;

pub(crate) const DEFAULT_INSIGHT_MODEL: &str = "gemini-2.0-flash";
pub(crate) const DEFAULT_VERIFICATION_MODEL: &str = "gemini-2.0-flash-thinking-exp-01-21";

/// Configuration for the optional Gemini-backed enrichment agents.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model used for the conversational insight.
    pub insight_model: String,
    /// Model used for statistic verification.
    pub verification_model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            insight_model: DEFAULT_INSIGHT_MODEL.to_string(),
            verification_model: DEFAULT_VERIFICATION_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum GeminiError {
    #[error("Network request failed for model {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for model {model} with status {status}")]
    HttpStatus {
        model: String,
        status: reqwest::StatusCode,
    },

    #[error("Response for model {0} carried no text content")]
    EmptyResponse(String),
}

pub(crate) struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub(crate) fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to build reqwest client");
        Self { client, api_key }
    }

    /// Sends a single-turn prompt and returns the first candidate's text.
    pub(crate) async fn generate(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, model);
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkRequest(model.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiError::HttpStatus {
                model: model.to_string(),
                status,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeminiError::NetworkRequest(model.to_string(), e))?;

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| GeminiError::EmptyResponse(model.to_string()))
    }
}
