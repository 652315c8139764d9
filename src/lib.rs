mod cache;
mod error;
mod history;
mod insight;
mod orchestrator;
mod raincheck;
mod stats;
mod types;
mod utils;

pub use error::RaincheckError;
pub use raincheck::*;

pub use cache::advisory::{missing_data_alert, missing_years_for_target, MissingDataAlert, Severity};
pub use cache::confidence::confidence_score;
pub use cache::entry::{CacheEntry, EntryMetadata, EntryPatch, StoredLocation};
pub use cache::key::CacheKey;
pub use cache::staleness::{check_staleness, StalenessCheck};
pub use cache::store::{FileStore, MemoryStore, PredictionStore};

pub use history::power::PowerClient;
pub use history::provider::HistoryProvider;

pub use insight::gemini::GeminiConfig;
pub use insight::reasoning::InsightAgent;
pub use insight::verification::VerificationAgent;

pub use stats::{compute_statistics, EmptySeries, RAIN_THRESHOLD_MM_DAY};

pub use types::enrichment::{AiInsight, Verification, VerificationStatus};
pub use types::observation::DayObservation;
pub use types::response::{CacheStatus, PredictionResult, QueryEcho};
pub use types::statistics::DayStatistics;

pub use cache::error::StoreError;
pub use history::error::HistoryError;
