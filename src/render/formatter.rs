//! Turns the backend's free-form summary text into simple markup.
//!
//! The text is split into blocks on blank lines and each block is classified by
//! a small ordered rule table: heading, then list, then paragraph.

use std::sync::LazyLock;

use regex::Regex;

pub const EMPTY_SUMMARY_HTML: &str = "<p>No summary available.</p>";

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s{3,}"));
static BLOCK_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{2,}"));
static COLON_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z][^\n]+:$"));
static UPPERCASE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z][A-Z\s]+$"));
static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^(?:[-•*]\s+|\d+\.\s+)"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    List(Vec<String>),
    Paragraph(String),
}

impl Block {
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Block::Heading(text) => format!("<h3>{}</h3>", escape_html(text)),
            Block::List(items) => {
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", escape_html(item)))
                    .collect();
                format!("<ul>{items}</ul>")
            }
            Block::Paragraph(text) => format!("<p>{}</p>", escape_html(text)),
        }
    }
}

/// Format raw summary text as markup. Empty input yields a placeholder paragraph.
#[must_use]
pub fn format_summary(text: &str) -> String {
    let blocks = classify(text);
    if blocks.is_empty() {
        return EMPTY_SUMMARY_HTML.to_string();
    }
    blocks.iter().map(Block::to_html).collect()
}

/// Split `text` into classified blocks, in order. Empty candidates are dropped.
#[must_use]
pub fn classify(text: &str) -> Vec<Block> {
    let normalized = WHITESPACE_RUN_RE.replace_all(text.trim(), "\n\n");

    let mut blocks = Vec::new();
    for candidate in BLOCK_SPLIT_RE.split(&normalized) {
        classify_candidate(candidate.trim(), &mut blocks);
    }
    blocks
}

fn classify_candidate(candidate: &str, blocks: &mut Vec<Block>) {
    if candidate.is_empty() {
        return;
    }

    if is_heading(candidate) {
        blocks.push(Block::Heading(candidate.to_string()));
        return;
    }

    // A heading line directly followed by its body, without a blank line between.
    if let Some((first, rest)) = candidate.split_once('\n')
        && is_heading(first.trim())
    {
        blocks.push(Block::Heading(first.trim().to_string()));
        classify_candidate(rest.trim(), blocks);
        return;
    }

    if LIST_MARKER_RE.is_match(candidate) {
        let items = candidate
            .lines()
            .map(|line| LIST_MARKER_RE.replace(line.trim(), "").trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        blocks.push(Block::List(items));
        return;
    }

    blocks.push(Block::Paragraph(candidate.to_string()));
}

fn is_heading(text: &str) -> bool {
    COLON_HEADING_RE.is_match(text) || UPPERCASE_HEADING_RE.is_match(text)
}

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
