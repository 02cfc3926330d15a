//! The page side: loading a document, the content agent, and extraction

pub mod agent;
pub mod extractor;
pub mod loader;

use async_trait::async_trait;

use crate::core::config::AppConfig;
use crate::core::models::TabInfo;
use crate::errors::SummarizerError;

pub use agent::{ContentChannel, spawn_page_agent};
pub use extractor::{ELLIPSIS, ExtractLimits, extract_main_content, truncate_content};
pub use loader::{LoadedPage, load_page};

/// The active tab as seen from the popup.
#[async_trait]
pub trait TabContext: Send + Sync {
    async fn active_tab(&self) -> TabInfo;

    /// # Errors
    ///
    /// Returns `ExtractionError` when the page cannot be reached or has no content.
    async fn page_content(&self) -> Result<String, SummarizerError>;
}

/// A loaded page with a running content agent behind it.
pub struct PageTab {
    tab: TabInfo,
    channel: ContentChannel,
}

impl PageTab {
    /// Open `page` and start its content agent. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn open(page: LoadedPage, config: &AppConfig) -> Self {
        let channel = spawn_page_agent(page.html, ExtractLimits::from(config), config.content_timeout);
        Self {
            tab: page.tab,
            channel,
        }
    }
}

#[async_trait]
impl TabContext for PageTab {
    async fn active_tab(&self) -> TabInfo {
        self.tab.clone()
    }

    async fn page_content(&self) -> Result<String, SummarizerError> {
        self.channel.request_content().await
    }
}
