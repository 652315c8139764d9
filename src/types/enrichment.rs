use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A natural-language weather insight produced by the reasoning agent.
///
/// Enrichment only: a missing or stale insight never affects the validity of
/// the cached statistics it annotates.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AiInsight {
    /// The generated recommendation text.
    pub reasoning: String,
    /// Model identifier that produced the text.
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
}

/// Outcome of the statistic verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// The verifier ran and found the statistics plausible.
    Verified,
    /// The verifier ran and flagged the statistics as implausible.
    Invalid,
    /// The verifier ran but its answer could not be interpreted.
    Unverified,
    /// Verification is not configured; distinct from `Invalid`.
    Skipped,
}

/// Verification payload attached to a prediction response.
///
/// Produced by [`crate::VerificationAgent::verify`], which never fails:
/// every failure mode collapses into a `Skipped` or `Unverified` payload.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,
    pub is_valid: bool,
    pub confidence: String,
    pub anomalies: Vec<String>,
    pub validation_notes: String,
    pub verified_by: String,
}

impl Verification {
    /// The payload returned when no verifier is configured.
    pub fn skipped() -> Self {
        Self {
            status: VerificationStatus::Skipped,
            is_valid: true,
            confidence: "not_verified".to_string(),
            anomalies: Vec::new(),
            validation_notes: "Verification skipped (no verifier configured)".to_string(),
            verified_by: "programmatic".to_string(),
        }
    }

    pub(crate) fn unverified(validation_notes: String, verified_by: &str) -> Self {
        Self {
            status: VerificationStatus::Unverified,
            is_valid: true,
            confidence: "low".to_string(),
            anomalies: Vec::new(),
            validation_notes,
            verified_by: verified_by.to_string(),
        }
    }
}
