//! Main-content extraction from a loaded page.
//!
//! Mirrors what a content script sees: paragraph-like and heading elements are
//! collected, short ones (navigation, captions, ads) are dropped, and the rest is
//! joined with blank lines. Pages without enough paragraph text fall back to the
//! visible body text.

use scraper::{ElementRef, Html, Node, Selector};

use crate::core::config::AppConfig;

/// Appended when the content had to be cut to the maximum length.
pub const ELLIPSIS: &str = "...";

const CONTENT_SELECTOR: &str = "p, h1, h2, h3, h4, h5, article";
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub min_paragraph_len: usize,
    pub fallback_len: usize,
    pub max_len: usize,
}

impl From<&AppConfig> for ExtractLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_paragraph_len: config.min_paragraph_len,
            fallback_len: config.fallback_len,
            max_len: config.max_content_len,
        }
    }
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Extract the text worth summarizing from `document`, bounded to `limits.max_len`
/// characters plus [`ELLIPSIS`].
#[must_use]
pub fn extract_main_content(document: &Html, limits: &ExtractLimits) -> String {
    let mut content = paragraph_text(document, limits.min_paragraph_len);

    if content.chars().count() < limits.fallback_len {
        content = visible_body_text(document);
    }

    truncate_content(content, limits.max_len)
}

fn paragraph_text(document: &Html, min_len: usize) -> String {
    let Ok(selector) = Selector::parse(CONTENT_SELECTOR) else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| text.chars().count() > min_len)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Text of `<body>` as a reader would see it: one line per text run, skipping
/// script and style contents.
#[must_use]
pub fn visible_body_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut lines: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| HIDDEN_TAGS.contains(&el.value().name()));
        if hidden {
            continue;
        }
        lines.extend(text.lines().map(str::trim).filter(|line| !line.is_empty()));
    }

    lines.join("\n")
}

/// Cut `content` to `max_len` characters, marking the cut with [`ELLIPSIS`].
#[must_use]
pub fn truncate_content(content: String, max_len: usize) -> String {
    match content.char_indices().nth(max_len) {
        Some((byte_end, _)) => {
            let mut truncated = content[..byte_end].to_string();
            truncated.push_str(ELLIPSIS);
            truncated
        }
        None => content,
    }
}

/// Document title, if the page declares a non-empty one.
#[must_use]
pub fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(word: &str) -> String {
        format!("{word} {}", "lorem ipsum dolor sit amet ".repeat(3))
    }

    #[test]
    fn keeps_long_paragraphs_and_headings_only() {
        let html = format!(
            "<html><body><nav><p>Home</p></nav><h1>{}</h1><p>{}</p><p>short</p></body></html>",
            long("Title"),
            long("Body")
        );
        let doc = Html::parse_document(&html);
        let content = extract_main_content(&doc, &ExtractLimits::default());

        assert_eq!(content, format!("{}\n\n{}", long("Title").trim(), long("Body").trim()));
        assert!(!content.contains("Home"));
    }

    #[test]
    fn falls_back_to_body_text_when_paragraphs_are_thin() {
        let html = "<html><head><title>T</title><style>p{}</style></head>\
                    <body><div>Only a div</div><p>tiny</p><script>var x = 1;</script></body></html>";
        let doc = Html::parse_document(html);
        let content = extract_main_content(&doc, &ExtractLimits::default());

        assert_eq!(content, "Only a div\ntiny");
    }

    #[test]
    fn truncation_appends_ellipsis_after_exact_budget() {
        let text = "é".repeat(25);
        let out = truncate_content(text, 10);
        assert_eq!(out.chars().count(), 10 + ELLIPSIS.len());
        assert!(out.ends_with(ELLIPSIS));

        let untouched = truncate_content("abc".to_string(), 10);
        assert_eq!(untouched, "abc");
    }

    #[test]
    fn reads_trimmed_title() {
        let doc = Html::parse_document("<html><head><title>  News  </title></head></html>");
        assert_eq!(page_title(&doc).as_deref(), Some("News"));

        let untitled = Html::parse_document("<html><body></body></html>");
        assert_eq!(page_title(&untitled), None);
    }
}
