use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::SummarizerError;

/// Base URL of the summarization backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Elements whose trimmed text is not longer than this are skipped.
pub const MIN_PARAGRAPH_LENGTH: usize = 40;

/// Below this length the extractor falls back to the full body text.
pub const FALLBACK_CONTENT_LENGTH: usize = 100;

/// Upper bound on the content sent to the backend, before the ellipsis.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

pub const DEFAULT_REVEAL_SPEED_MS: u64 = 5;
pub const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub min_paragraph_len: usize,
    pub fallback_len: usize,
    pub max_content_len: usize,
    pub reveal_speed: Duration,
    pub content_timeout: Duration,
    pub request_timeout: Duration,
    pub store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_paragraph_len: MIN_PARAGRAPH_LENGTH,
            fallback_len: FALLBACK_CONTENT_LENGTH,
            max_content_len: MAX_CONTENT_LENGTH,
            reveal_speed: Duration::from_millis(DEFAULT_REVEAL_SPEED_MS),
            content_timeout: Duration::from_secs(DEFAULT_CONTENT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            store_path: default_store_path(),
        }
    }
}

impl AppConfig {
    /// Build-time defaults, with the few knobs that make sense outside a browser
    /// overridable from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a numeric override does not parse.
    pub fn from_env() -> Result<Self, SummarizerError> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("PAGESUM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(ms) = env::var("PAGESUM_REVEAL_MS") {
            config.reveal_speed = Duration::from_millis(parse_number("PAGESUM_REVEAL_MS", &ms)?);
        }
        if let Ok(secs) = env::var("PAGESUM_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("PAGESUM_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Ok(path) = env::var("PAGESUM_STORE_PATH") {
            config.store_path = PathBuf::from(path);
        }

        Ok(config)
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64, SummarizerError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| SummarizerError::ConfigError(format!("{name}: {e}")))
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("pagesum")
        .join("storage.json")
}
