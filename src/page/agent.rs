//! Request/response messaging between the popup and the page context.
//!
//! The page agent owns the loaded document and answers `getContent` requests.
//! Requests carry an id; a router task matches responses back to the waiting
//! caller, and the caller gives up after a timeout if the page never answers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::extractor::{ExtractLimits, extract_main_content};
use crate::errors::SummarizerError;

const CHANNEL_CAPACITY: usize = 8;

pub const NO_CONTENT_MESSAGE: &str = "Could not extract content from page.";
pub const UNREACHABLE_MESSAGE: &str =
    "Could not establish connection. Receiving end does not exist.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GetContent,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub id: u64,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub struct ContentResponse {
    pub id: u64,
    pub result: Result<String, String>,
}

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<String, String>>>>>;

/// Start the page-side agent for `html` and return the popup-side end of the channel.
#[must_use]
pub fn spawn_page_agent(html: String, limits: ExtractLimits, timeout: Duration) -> ContentChannel {
    let (request_tx, request_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (response_tx, response_rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(run_page_agent(html, limits, request_rx, response_tx));
    ContentChannel::connect(request_tx, response_rx, timeout)
}

/// Page-side loop: answer each request until the popup side goes away.
pub async fn run_page_agent(
    html: String,
    limits: ExtractLimits,
    mut requests: mpsc::Receiver<ContentRequest>,
    responses: mpsc::Sender<ContentResponse>,
) {
    info!("Page agent ready");
    while let Some(request) = requests.recv().await {
        debug!(id = request.id, action = ?request.action, "Message received in page agent");
        let result = match request.action {
            Action::GetContent => {
                let content = extract_from_html(&html, &limits);
                info!(id = request.id, length = content.chars().count(), "Content extracted");
                Ok(content)
            }
            Action::Unsupported => Err("Unsupported action".to_string()),
        };

        if responses.send(ContentResponse { id: request.id, result }).await.is_err() {
            break;
        }
    }
    debug!("Page agent stopped");
}

// `Html` is not `Send`, so it is parsed and dropped without crossing an await.
fn extract_from_html(html: &str, limits: &ExtractLimits) -> String {
    let document = Html::parse_document(html);
    extract_main_content(&document, limits)
}

/// Popup-side end of the page channel.
pub struct ContentChannel {
    requests: mpsc::Sender<ContentRequest>,
    pending: Pending,
    next_id: AtomicU64,
    timeout: Duration,
}

impl ContentChannel {
    /// Wire a request sender and response receiver into a correlated channel.
    #[must_use]
    pub fn connect(
        requests: mpsc::Sender<ContentRequest>,
        responses: mpsc::Receiver<ContentResponse>,
        timeout: Duration,
    ) -> Self {
        let pending: Pending = Arc::default();
        tokio::spawn(route_responses(responses, Arc::clone(&pending)));
        Self {
            requests,
            pending,
            next_id: AtomicU64::new(1),
            timeout,
        }
    }

    /// Ask the page for its main content.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError` if the page is unreachable, does not answer in
    /// time, reports an error, or answers with no usable content.
    pub async fn request_content(&self) -> Result<String, SummarizerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.pending).insert(id, reply_tx);

        let request = ContentRequest {
            id,
            action: Action::GetContent,
        };
        if self.requests.send(request).await.is_err() {
            lock(&self.pending).remove(&id);
            return Err(SummarizerError::ExtractionError(UNREACHABLE_MESSAGE.to_string()));
        }

        match tokio::time::timeout(self.timeout, reply_rx).await {
            Ok(Ok(Ok(content))) if !content.trim().is_empty() => Ok(content),
            Ok(Ok(Ok(_))) => Err(SummarizerError::ExtractionError(NO_CONTENT_MESSAGE.to_string())),
            Ok(Ok(Err(message))) => Err(SummarizerError::ExtractionError(message)),
            Ok(Err(_)) => Err(SummarizerError::ExtractionError(UNREACHABLE_MESSAGE.to_string())),
            Err(_) => {
                lock(&self.pending).remove(&id);
                Err(SummarizerError::ExtractionError(format!(
                    "Page did not respond within {} ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

async fn route_responses(mut responses: mpsc::Receiver<ContentResponse>, pending: Pending) {
    while let Some(response) = responses.recv().await {
        match lock(&pending).remove(&response.id) {
            Some(reply) => {
                let _ = reply.send(response.result);
            }
            None => warn!(id = response.id, "Dropping response with no waiting request"),
        }
    }
    // Page side is gone: fail every waiter instead of letting them time out.
    lock(&pending).clear();
}

fn lock(pending: &Pending) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<Result<String, String>>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "<html><body><article>\
        This article body is comfortably longer than the minimum paragraph length \
        and longer than the fallback threshold too, so it is kept as is.</article></body></html>";

    #[tokio::test]
    async fn returns_extracted_content() {
        let channel = spawn_page_agent(ARTICLE.to_string(), ExtractLimits::default(), Duration::from_secs(1));
        let content = channel.request_content().await.unwrap();
        assert!(content.starts_with("This article body"));
    }

    #[tokio::test]
    async fn empty_page_is_an_extraction_error() {
        let channel = spawn_page_agent(
            "<html><body></body></html>".to_string(),
            ExtractLimits::default(),
            Duration::from_secs(1),
        );
        let err = channel.request_content().await.unwrap_err();
        assert!(matches!(err, SummarizerError::ExtractionError(ref m) if m == NO_CONTENT_MESSAGE));
    }

    #[tokio::test]
    async fn closed_page_is_unreachable() {
        let (request_tx, request_rx) = mpsc::channel(1);
        let (_response_tx, response_rx) = mpsc::channel(1);
        drop(request_rx);
        let channel = ContentChannel::connect(request_tx, response_rx, Duration::from_secs(1));

        let err = channel.request_content().await.unwrap_err();
        assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn silent_page_times_out() {
        let (request_tx, _request_rx) = mpsc::channel(1);
        let (_response_tx, response_rx) = mpsc::channel(1);
        let channel = ContentChannel::connect(request_tx, response_rx, Duration::from_millis(20));

        let err = channel.request_content().await.unwrap_err();
        assert!(err.user_message().contains("did not respond"));
    }

    #[tokio::test]
    async fn uncorrelated_responses_are_ignored() {
        let (request_tx, mut request_rx) = mpsc::channel::<ContentRequest>(1);
        let (response_tx, response_rx) = mpsc::channel(4);
        let channel = ContentChannel::connect(request_tx, response_rx, Duration::from_secs(1));

        tokio::spawn(async move {
            let request = request_rx.recv().await.unwrap();
            response_tx
                .send(ContentResponse { id: request.id + 100, result: Ok("stray".into()) })
                .await
                .unwrap();
            response_tx
                .send(ContentResponse { id: request.id, result: Ok("mine".into()) })
                .await
                .unwrap();
        });

        assert_eq!(channel.request_content().await.unwrap(), "mine");
    }

    #[test]
    fn decodes_wire_request() {
        let request: ContentRequest = serde_json::from_str(r#"{"id":7,"action":"getContent"}"#).unwrap();
        assert_eq!(request.action, Action::GetContent);

        let other: ContentRequest = serde_json::from_str(r#"{"id":8,"action":"highlight"}"#).unwrap();
        assert_eq!(other.action, Action::Unsupported);
    }
}
