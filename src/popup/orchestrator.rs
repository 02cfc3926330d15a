//! The popup controller: wires the summarize, download, and clear actions to
//! extraction, the backend, formatting, the reveal, and the summary cache.
//!
//! Actions are handled one at a time. An action that arrives while another is
//! still running is rejected with [`SummarizerError::Busy`]; the reveal that
//! follows a summary runs in the background and is cancelled by the next
//! open, summarize or clear.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::opener::LinkOpener;
use crate::core::config::DEFAULT_REVEAL_SPEED_MS;
use crate::core::models::{CachedSummary, DetailLevel, SummaryResponse, TabInfo};
use crate::errors::SummarizerError;
use crate::page::TabContext;
use crate::remote::SummaryService;
use crate::render::formatter::{escape_html, format_summary};
use crate::render::reveal::{RevealHandle, start_reveal};
use crate::render::surface::Surface;
use crate::storage::SummaryStore;

pub const IDLE_PLACEHOLDER_HTML: &str = "<p>Click the button to summarize the current webpage.</p>";
pub const LOADING_HTML: &str = "<div class=\"loading\">Generating summary</div>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Idle,
    Loading,
    Displayed,
    Error,
}

#[must_use]
pub fn error_html(message: &str) -> String {
    format!("<p class=\"error\">Error: {}</p>", escape_html(message))
}

struct Inner {
    state: PopupState,
    summary_id: Option<String>,
    reveal: Option<RevealHandle>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Popup {
    surface: Arc<dyn Surface>,
    store: Arc<dyn SummaryStore>,
    service: Arc<dyn SummaryService>,
    tab: Arc<dyn TabContext>,
    opener: Arc<dyn LinkOpener>,
    reveal_speed: Duration,
    busy: AtomicBool,
    inner: Mutex<Inner>,
}

impl Popup {
    #[must_use]
    pub fn new(
        surface: Arc<dyn Surface>,
        store: Arc<dyn SummaryStore>,
        service: Arc<dyn SummaryService>,
        tab: Arc<dyn TabContext>,
        opener: Arc<dyn LinkOpener>,
    ) -> Self {
        Self {
            surface,
            store,
            service,
            tab,
            opener,
            reveal_speed: Duration::from_millis(DEFAULT_REVEAL_SPEED_MS),
            busy: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                state: PopupState::Idle,
                summary_id: None,
                reveal: None,
            }),
        }
    }

    #[must_use]
    pub fn with_reveal_speed(mut self, speed: Duration) -> Self {
        self.reveal_speed = speed;
        self
    }

    #[must_use]
    pub fn state(&self) -> PopupState {
        self.inner().state
    }

    #[must_use]
    pub fn current_summary_id(&self) -> Option<String> {
        self.inner().summary_id.clone()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<BusyGuard<'_>, SummarizerError> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| BusyGuard(&self.busy))
            .map_err(|_| SummarizerError::Busy)
    }

    async fn cancel_reveal(&self) {
        let handle = self.inner().reveal.take();
        if let Some(handle) = handle {
            handle.cancel().await;
        }
    }

    fn show_idle(&self) {
        self.surface.set_html(IDLE_PLACEHOLDER_HTML);
        self.surface.set_actions_visible(false);
        let mut inner = self.inner();
        inner.state = PopupState::Idle;
        inner.summary_id = None;
    }

    /// Restore the cached summary if it belongs to the active tab.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another action is running. Storage failures are logged
    /// and leave the popup idle.
    pub async fn open(&self) -> Result<PopupState, SummarizerError> {
        let _busy = self.begin()?;
        self.cancel_reveal().await;
        let tab = self.tab.active_tab().await;
        self.show_idle();

        let cached = match self.store.get().await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Failed to read saved summary: {}", e);
                None
            }
        };

        match cached {
            Some(cached) if cached.belongs_to(&tab) => {
                info!(url = %tab.url, summary_id = %cached.summary_id, "Restoring saved summary");
                // Saved summaries are shown at once, without the typing effect.
                self.surface.set_html(&cached.summary_html);
                self.surface.set_actions_visible(true);
                let mut inner = self.inner();
                inner.state = PopupState::Displayed;
                inner.summary_id = Some(cached.summary_id);
            }
            Some(cached) => {
                info!(saved_url = %cached.url, tab_url = %tab.url, "Saved summary is for another page");
            }
            None => {}
        }

        Ok(self.state())
    }

    /// Summarize the active tab at `detail_level`.
    ///
    /// Failures along the way are shown on the surface and leave the popup in
    /// [`PopupState::Error`]; they are not returned.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another action is running.
    pub async fn summarize(&self, detail_level: DetailLevel) -> Result<PopupState, SummarizerError> {
        let _busy = self.begin()?;
        let span = info_span!("summarize", correlation_id = %Uuid::new_v4(), %detail_level);

        async {
            self.cancel_reveal().await;
            self.surface.set_actions_visible(false);
            self.surface.set_html(LOADING_HTML);
            self.inner().state = PopupState::Loading;

            match self.fetch_summary(detail_level).await {
                Ok((tab, summary)) => self.display_and_store(&tab, summary).await,
                Err(e) => {
                    error!("Error: {}", e);
                    self.surface.set_html(&error_html(&e.user_message()));
                    let mut inner = self.inner();
                    inner.state = PopupState::Error;
                    inner.summary_id = None;
                }
            }
        }
        .instrument(span)
        .await;

        Ok(self.state())
    }

    async fn fetch_summary(
        &self,
        detail_level: DetailLevel,
    ) -> Result<(TabInfo, SummaryResponse), SummarizerError> {
        let tab = self.tab.active_tab().await;
        let content = self.tab.page_content().await?;
        let summary = self
            .service
            .generate_summary(&content, &tab, detail_level)
            .await?;
        Ok((tab, summary))
    }

    async fn display_and_store(&self, tab: &TabInfo, summary: SummaryResponse) {
        let summary_html = format_summary(&summary.summary_text);

        // Actions appear once the reveal has typed the whole summary.
        let reveal = start_reveal(Arc::clone(&self.surface), &summary_html, self.reveal_speed);
        {
            let mut inner = self.inner();
            inner.state = PopupState::Displayed;
            inner.summary_id = Some(summary.summary_id.clone());
            inner.reveal = Some(reveal);
        }

        let cached = CachedSummary {
            summary_html,
            summary_id: summary.summary_id,
            url: tab.url.clone(),
            title: tab.title.clone(),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.store.set(&cached).await {
            warn!("Failed to save summary: {}", e);
        }
    }

    /// Open the download link for the displayed summary. Does nothing unless a
    /// summary is displayed.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another action is running, or the opener's error.
    pub async fn download(&self) -> Result<(), SummarizerError> {
        let _busy = self.begin()?;
        let summary_id = {
            let inner = self.inner();
            match (&inner.state, &inner.summary_id) {
                (PopupState::Displayed, Some(id)) => Some(id.clone()),
                _ => None,
            }
        };

        let Some(summary_id) = summary_id else {
            error!("No summary available to download");
            return Ok(());
        };

        let url = self.service.download_url(&summary_id);
        info!(%url, "Opening download link");
        self.opener.open(&url).await.inspect_err(|e| {
            error!("Error downloading summary: {}", e);
        })
    }

    /// Reset to the placeholder and forget the cached summary.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another action is running. Storage failures are logged.
    pub async fn clear(&self) -> Result<PopupState, SummarizerError> {
        let _busy = self.begin()?;
        self.cancel_reveal().await;
        self.show_idle();

        if let Err(e) = self.store.delete().await {
            warn!("Failed to remove saved summary: {}", e);
        }

        Ok(self.state())
    }

    /// Wait for the current reveal, if any, to finish. Returns `false` if it was
    /// cancelled.
    pub async fn wait_for_reveal(&self) -> bool {
        let handle = self.inner().reveal.take();
        match handle {
            Some(handle) => handle.finished().await,
            None => true,
        }
    }
}
