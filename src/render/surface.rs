//! Display targets for the popup's summary area.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use super::formatter::escape_html;

const TERMINAL_WIDTH: usize = 80;

/// The summary area of the popup.
///
/// Element handles returned by `append_element` are only valid until the next
/// `clear` or `set_html`; writes to a stale handle are ignored.
pub trait Surface: Send + Sync {
    /// Replace the whole area with `html`.
    fn set_html(&self, html: &str);
    fn clear(&self);
    /// Append an empty `tag` element and return a handle to it.
    fn append_element(&self, tag: &str) -> usize;
    fn push_char(&self, element: usize, ch: char);
    /// Show or hide the download and clear buttons.
    fn set_actions_visible(&self, visible: bool);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Markup(String),
    Element { tag: String, text: String },
}

#[derive(Debug, Default)]
struct SurfaceState {
    fragments: Vec<Fragment>,
    actions_visible: bool,
    writes: usize,
}

/// Surface that keeps its content in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current content serialized as markup.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.state()
            .fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Markup(html) => html.clone(),
                Fragment::Element { tag, text } => format!("<{tag}>{}</{tag}>", escape_html(text)),
            })
            .collect()
    }

    #[must_use]
    pub fn actions_visible(&self) -> bool {
        self.state().actions_visible
    }

    /// Number of content mutations so far; lets callers observe that nothing changed.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.state().writes
    }
}

impl Surface for MemorySurface {
    fn set_html(&self, html: &str) {
        let mut state = self.state();
        state.fragments = vec![Fragment::Markup(html.to_string())];
        state.writes += 1;
    }

    fn clear(&self) {
        let mut state = self.state();
        state.fragments.clear();
        state.writes += 1;
    }

    fn append_element(&self, tag: &str) -> usize {
        let mut state = self.state();
        state.fragments.push(Fragment::Element {
            tag: tag.to_string(),
            text: String::new(),
        });
        state.writes += 1;
        state.fragments.len() - 1
    }

    fn push_char(&self, element: usize, ch: char) {
        let mut state = self.state();
        if let Some(Fragment::Element { text, .. }) = state.fragments.get_mut(element) {
            text.push(ch);
            state.writes += 1;
        }
    }

    fn set_actions_visible(&self, visible: bool) {
        self.state().actions_visible = visible;
    }
}

/// Surface that prints to stdout, rendering markup as plain text.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    elements: Mutex<usize>,
}

impl TerminalSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl Surface for TerminalSurface {
    fn set_html(&self, html: &str) {
        let text = html2text::from_read(html.as_bytes(), TERMINAL_WIDTH).unwrap_or_else(|e| {
            warn!("Failed to render markup as text: {}", e);
            html.to_string()
        });
        *self.elements.lock().unwrap_or_else(PoisonError::into_inner) = 0;
        Self::write(&format!("{}\n", text.trim_end()));
    }

    fn clear(&self) {
        *self.elements.lock().unwrap_or_else(PoisonError::into_inner) = 0;
        Self::write("\n");
    }

    fn append_element(&self, tag: &str) -> usize {
        let mut elements = self.elements.lock().unwrap_or_else(PoisonError::into_inner);
        let prefix = match (tag, *elements) {
            ("li", _) => "\n  * ",
            ("h3", 0) => "## ",
            ("h3", _) => "\n\n## ",
            (_, 0) => "",
            _ => "\n\n",
        };
        Self::write(prefix);
        *elements += 1;
        *elements - 1
    }

    fn push_char(&self, _element: usize, ch: char) {
        let mut buf = [0u8; 4];
        Self::write(ch.encode_utf8(&mut buf));
    }

    fn set_actions_visible(&self, visible: bool) {
        if visible {
            Self::write("\n\n[download] [clear]\n");
        }
    }
}
