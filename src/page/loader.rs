use std::path::Path;

use anyhow::{Context, bail};
use reqwest::Client;
use scraper::Html;
use tracing::info;
use url::Url;

use super::extractor::page_title;
use crate::core::models::TabInfo;

/// A page ready to be opened in a tab: its identity plus raw markup.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub tab: TabInfo,
    pub html: String,
}

impl LoadedPage {
    /// Build a page from markup already in memory.
    #[must_use]
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let html = html.into();
        let title = page_title(&Html::parse_document(&html)).unwrap_or_else(|| url.clone());
        Self {
            tab: TabInfo { url, title },
            html,
        }
    }
}

/// Load `source`, either an `http(s)` URL or a path to a local HTML file.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched or read.
pub async fn load_page(client: &Client, source: &str) -> anyhow::Result<LoadedPage> {
    if let Ok(url) = Url::parse(source)
        && matches!(url.scheme(), "http" | "https")
    {
        info!(url = %url, "Fetching page");
        let response = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch {url}: status {status}");
        }
        let html = response.text().await.context("Failed to read page body")?;
        return Ok(LoadedPage::from_html(url.to_string(), html));
    }

    let path = Path::new(source);
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let absolute = tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let url = Url::from_file_path(&absolute)
        .map_or_else(|()| absolute.display().to_string(), |u| u.to_string());

    Ok(LoadedPage::from_html(url, html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_falls_back_to_url() {
        let page = LoadedPage::from_html("https://example.com/a", "<p>no title</p>");
        assert_eq!(page.tab.title, "https://example.com/a");

        let titled = LoadedPage::from_html("https://example.com/b", "<title>B</title>");
        assert_eq!(titled.tab.title, "B");
    }

    #[tokio::test]
    async fn loads_local_file_as_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><head><title>Local</title></head></html>").unwrap();

        let page = load_page(&Client::new(), path.to_str().unwrap()).await.unwrap();
        assert!(page.tab.url.starts_with("file://"));
        assert_eq!(page.tab.title, "Local");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = load_page(&Client::new(), "/definitely/not/here.html").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
