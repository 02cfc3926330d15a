use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The tab the popup was opened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub url: String,
    pub title: String,
}

/// Verbosity hint forwarded to the summarization backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [DetailLevel::Brief, DetailLevel::Standard, DetailLevel::Detailed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DetailLevel::Brief => "brief",
            DetailLevel::Standard => "standard",
            DetailLevel::Detailed => "detailed",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetailLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown detail level: {s}"))
    }
}

/// Body of `POST /summarize`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    pub url: String,
    pub title: String,
    pub content: String,
    pub detail_level: DetailLevel,
}

/// Success body of `POST /summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryResponse {
    #[serde(rename = "summary", default)]
    pub summary_text: String,
    pub summary_id: String,
}

/// The single persisted summary, shown again when the popup reopens on the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSummary {
    pub summary_html: String,
    pub summary_id: String,
    pub url: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

impl CachedSummary {
    #[must_use]
    pub fn belongs_to(&self, tab: &TabInfo) -> bool {
        self.url == tab.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_level_serializes_lowercase() {
        let request = SummaryRequest {
            url: "https://example.com".into(),
            title: "Example".into(),
            content: "body".into(),
            detail_level: DetailLevel::Detailed,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["detail_level"], "detailed");
        assert_eq!(value["url"], "https://example.com");
    }

    #[test]
    fn detail_level_parses_case_insensitively() {
        assert_eq!("Brief".parse::<DetailLevel>().unwrap(), DetailLevel::Brief);
        assert!("verbose".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn cached_summary_uses_extension_field_names() {
        let cached = CachedSummary {
            summary_html: "<p>x</p>".into(),
            summary_id: "20240101_42".into(),
            url: "https://example.com".into(),
            title: "Example".into(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&cached).unwrap();
        assert_eq!(value["summaryHtml"], "<p>x</p>");
        assert_eq!(value["summaryId"], "20240101_42");
    }
}
