//! Typing-effect reveal of formatted markup.
//!
//! Each text run of the markup is replayed into a fresh copy of its parent
//! element, one character per tick. The reveal runs as its own task and stops at
//! the next tick once its cancellation token fires. The surface's actions are
//! shown only after the last character is typed.

use std::sync::Arc;
use std::time::Duration;

use scraper::{ElementRef, Html, Node};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::surface::Surface;

/// A text node of the markup together with the element that contained it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub tag: String,
    pub text: String,
}

/// Collect the text runs of `markup` in document order.
#[must_use]
pub fn text_runs(markup: &str) -> Vec<TextRun> {
    let fragment = Html::parse_fragment(markup);
    let mut runs = Vec::new();

    for node in fragment.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let tag = node
            .parent()
            .and_then(ElementRef::wrap)
            .map_or("p", |parent| parent.value().name());
        // Text directly under the fragment root has no element of its own.
        let tag = if tag == "html" { "p" } else { tag };
        runs.push(TextRun {
            tag: tag.to_string(),
            text: text.to_string(),
        });
    }

    runs
}

/// Clear `surface` and type `runs` into it. Returns `false` if cancelled first.
pub async fn reveal(
    surface: Arc<dyn Surface>,
    runs: Vec<TextRun>,
    speed: Duration,
    token: CancellationToken,
) -> bool {
    surface.clear();
    type_runs(surface.as_ref(), runs, speed, &token).await
}

async fn type_runs(
    surface: &dyn Surface,
    runs: Vec<TextRun>,
    speed: Duration,
    token: &CancellationToken,
) -> bool {
    for run in runs {
        if token.is_cancelled() {
            return false;
        }
        let element = surface.append_element(&run.tag);
        for ch in run.text.chars() {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!("Reveal cancelled");
                    return false;
                }
                () = tokio::time::sleep(speed) => {}
            }
            surface.push_char(element, ch);
        }
    }

    true
}

/// A reveal in progress.
pub struct RevealHandle {
    token: CancellationToken,
    task: JoinHandle<bool>,
}

impl RevealHandle {
    /// Stop the reveal. No surface writes happen after this returns.
    pub async fn cancel(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!("Reveal task failed: {}", e);
        }
    }

    /// Wait for the reveal to finish; `true` if it ran to completion.
    pub async fn finished(self) -> bool {
        match self.task.await {
            Ok(completed) => completed,
            Err(e) => {
                warn!("Reveal task failed: {}", e);
                false
            }
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Clear `surface` and start revealing `markup` on it, showing the actions when
/// done. Must be called inside a Tokio runtime.
#[must_use]
pub fn start_reveal(surface: Arc<dyn Surface>, markup: &str, speed: Duration) -> RevealHandle {
    let runs = text_runs(markup);
    let token = CancellationToken::new();
    surface.clear();

    let task = tokio::spawn({
        let token = token.clone();
        async move {
            let completed = type_runs(surface.as_ref(), runs, speed, &token).await;
            if completed {
                surface.set_actions_visible(true);
            }
            completed
        }
    });
    RevealHandle { token, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::MemorySurface;

    #[test]
    fn runs_keep_their_parent_element() {
        let runs = text_runs("<h3>Title:</h3><ul><li>a</li><li>b &amp; c</li></ul><p>end</p>");
        let tags: Vec<&str> = runs.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, ["h3", "li", "li", "p"]);
        assert_eq!(runs[2].text, "b & c");
    }

    #[tokio::test]
    async fn completed_reveal_reproduces_markup() {
        let surface = Arc::new(MemorySurface::new());
        let handle = start_reveal(surface.clone(), "<h3>Hi:</h3><p>there</p>", Duration::ZERO);

        assert!(handle.finished().await);
        assert_eq!(surface.inner_html(), "<h3>Hi:</h3><p>there</p>");
    }

    #[tokio::test]
    async fn inline_reveal_stops_on_cancelled_token() {
        let surface = Arc::new(MemorySurface::new());
        surface.set_html("<p>old</p>");
        let token = CancellationToken::new();
        token.cancel();

        let completed = reveal(surface.clone(), text_runs("<p>new</p>"), Duration::ZERO, token).await;

        assert!(!completed);
        assert_eq!(surface.inner_html(), "");
    }

    #[tokio::test]
    async fn surface_is_cleared_before_the_task_runs() {
        let surface = Arc::new(MemorySurface::new());
        surface.set_html("<div class=\"loading\">Generating summary</div>");

        let handle = start_reveal(surface.clone(), "<p>abc</p>", Duration::from_millis(5));
        assert_eq!(surface.inner_html(), "");
        assert!(!surface.actions_visible());

        assert!(handle.finished().await);
        assert_eq!(surface.inner_html(), "<p>abc</p>");
        assert!(surface.actions_visible());
    }

    #[tokio::test]
    async fn cancelled_reveal_leaves_actions_hidden() {
        let surface = Arc::new(MemorySurface::new());
        let markup = format!("<p>{}</p>", "y".repeat(200));
        let handle = start_reveal(surface.clone(), &markup, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(15)).await;
        handle.cancel().await;

        assert!(!surface.actions_visible());
    }

    #[tokio::test]
    async fn cancel_stops_further_writes() {
        let surface = Arc::new(MemorySurface::new());
        let markup = format!("<p>{}</p>", "x".repeat(500));
        let handle = start_reveal(surface.clone(), &markup, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel().await;
        let writes = surface.write_count();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(surface.write_count(), writes);
        assert!(surface.inner_html().len() < markup.len());
    }
}
