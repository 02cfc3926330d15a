//! HTTP client for the summarization backend.
//!
//! One request per summary: `POST {base}/summarize` with the page content, then
//! the returned id is only used to build `{base}/download/{id}`.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{error, info};

use crate::core::config::AppConfig;
use crate::core::models::{DetailLevel, SummaryRequest, SummaryResponse, TabInfo};
use crate::errors::SummarizerError;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate summary";

/// The summarization backend, as the popup uses it.
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// # Errors
    ///
    /// Returns `RemoteError` on transport failure, a non-success status, or an
    /// unparseable response body.
    async fn generate_summary(
        &self,
        content: &str,
        tab: &TabInfo,
        detail_level: DetailLevel,
    ) -> Result<SummaryResponse, SummarizerError>;

    fn download_url(&self, summary_id: &str) -> String;
}

/// A summary file served by the download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub body: String,
}

pub struct SummaryClient {
    http: Client,
    base_url: String,
}

impl SummaryClient {
    /// # Errors
    ///
    /// Returns `ConfigError` if the HTTP client cannot be built or the base URL
    /// is not a valid URL.
    pub fn new(config: &AppConfig) -> Result<Self, SummarizerError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| SummarizerError::ConfigError(format!("base URL {}: {e}", config.base_url)))?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SummarizerError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(http, &config.base_url))
    }

    #[must_use]
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the text file behind [`SummaryService::download_url`].
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on transport failure or a non-success status.
    pub async fn fetch_download(&self, summary_id: &str) -> Result<DownloadedFile, SummarizerError> {
        self.fetch_file(&self.download_url(summary_id)).await
    }

    /// GET `url` and name the result after its `Content-Disposition`, falling
    /// back to the last path segment.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on transport failure or a non-success status.
    pub async fn fetch_file(&self, url: &str) -> Result<DownloadedFile, SummarizerError> {
        info!(%url, "Downloading summary");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Download failed");
            return Err(SummarizerError::RemoteError(error_message(&body)));
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| {
                let id = url.rsplit('/').next().unwrap_or_default();
                format!("summary_{}.txt", urlencoding::decode(id).unwrap_or_default())
            });
        let body = response.text().await?;

        Ok(DownloadedFile { filename, body })
    }
}

#[async_trait]
impl SummaryService for SummaryClient {
    async fn generate_summary(
        &self,
        content: &str,
        tab: &TabInfo,
        detail_level: DetailLevel,
    ) -> Result<SummaryResponse, SummarizerError> {
        let request = SummaryRequest {
            url: tab.url.clone(),
            title: tab.title.clone(),
            content: content.to_string(),
            detail_level,
        };

        #[cfg(feature = "debug-logs")]
        info!("Summary request body: {:?}", request);

        info!(
            url = %request.url,
            detail_level = %detail_level,
            content_chars = request.content.chars().count(),
            "Requesting summary"
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .http
            .post(format!("{}/summarize", self.base_url))
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Summarization service returned an error");
            return Err(SummarizerError::RemoteError(error_message(&body)));
        }

        let summary: SummaryResponse = response.json().await.map_err(|e| {
            SummarizerError::RemoteError(format!("Failed to parse summary response: {e}"))
        })?;
        info!(summary_id = %summary.summary_id, "Summary received");

        Ok(summary)
    }

    fn download_url(&self, summary_id: &str) -> String {
        format!("{}/download/{summary_id}", self.base_url)
    }
}

fn error_message(body: &str) -> String {
    if body.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        body.to_string()
    }
}

#[must_use]
fn filename_from_disposition(header: &str) -> Option<String> {
    static FILENAME_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
        Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#)
            .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
    });

    FILENAME_RE
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_joins_base_and_id() {
        let client = SummaryClient::with_client(Client::new(), "http://localhost:5000/");
        assert_eq!(
            client.download_url("20240101120000_42"),
            "http://localhost:5000/download/20240101120000_42"
        );
    }

    #[test]
    fn download_url_keeps_id_verbatim() {
        let client = SummaryClient::with_client(Client::new(), "http://localhost:5000");
        assert_eq!(
            client.download_url("2024-01-01T12:00_42"),
            "http://localhost:5000/download/2024-01-01T12:00_42"
        );
    }

    #[test]
    fn blank_error_body_gets_generic_message() {
        assert_eq!(error_message("  "), GENERIC_FAILURE_MESSAGE);
        assert_eq!(error_message("quota exceeded"), "quota exceeded");
    }

    #[test]
    fn parses_attachment_filename() {
        assert_eq!(
            filename_from_disposition("attachment; filename=My_Page_summary.txt").as_deref(),
            Some("My_Page_summary.txt")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="quoted.txt""#).as_deref(),
            Some("quoted.txt")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }
}
