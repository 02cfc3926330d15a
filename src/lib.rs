//! pagesum - summarize the page you are reading.
//!
//! A popup-style client for a web page summarization service: the main text of
//! the current page is extracted, sent to the backend, and the returned summary
//! is formatted and revealed with a typing effect. The last summary is cached
//! per page URL so reopening the popup on the same page shows it at once.
//!
//! # Architecture
//!
//! - `page`: loads the document and runs the content agent that extracts its text
//! - `remote`: reqwest client for `POST /summarize` and the download link
//! - `render`: text-to-markup formatting, the reveal animation, display surfaces
//! - `storage`: the single-slot summary cache
//! - `popup`: the controller sequencing the user actions
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pagesum::core::{AppConfig, DetailLevel};
//! use pagesum::page::{PageTab, load_page};
//! use pagesum::popup::{Popup, PrintOpener};
//! use pagesum::remote::SummaryClient;
//! use pagesum::render::TerminalSurface;
//! use pagesum::storage::FileStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     pagesum::setup_logging();
//!     let config = AppConfig::from_env()?;
//!
//!     let page = load_page(&reqwest::Client::new(), "https://example.com").await?;
//!     let popup = Popup::new(
//!         Arc::new(TerminalSurface::new()),
//!         Arc::new(FileStore::new(&config.store_path)),
//!         Arc::new(SummaryClient::new(&config)?),
//!         Arc::new(PageTab::open(page, &config)),
//!         Arc::new(PrintOpener),
//!     );
//!
//!     popup.open().await?;
//!     popup.summarize(DetailLevel::Standard).await?;
//!     popup.wait_for_reveal().await;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod page;
pub mod popup;
pub mod remote;
pub mod render;
pub mod storage;

pub use errors::SummarizerError;

/// Configure structured JSON logging on stderr.
///
/// Stdout is left to the terminal surface. The level comes from `RUST_LOG`,
/// defaulting to `info`.
///
/// # Example
///
/// ```
/// pagesum::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
