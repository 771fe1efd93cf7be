//! Best-effort text scrape of DOCX bytes
//!
//! The bytes are read one char per byte and scanned for `<w:t ...>...</w:t>`
//! runs. There is no archive or XML handling, so compressed documents usually
//! yield nothing.

use once_cell::sync::Lazy;
use regex::Regex;

static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t[^>]*>([^<]*)</w:t>").expect("text run pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocxText {
    /// No text-run tags at all
    NoTextRuns,
    /// Runs found but all of them empty
    Empty,
    /// Run contents joined with single spaces, trimmed
    Text(String),
}

pub fn extract_text(bytes: &[u8]) -> DocxText {
    let raw: String = bytes.iter().map(|&b| char::from(b)).collect();

    let fragments: Vec<&str> = TEXT_RUN
        .captures_iter(&raw)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .collect();

    if fragments.is_empty() {
        return DocxText::NoTextRuns;
    }

    let text = fragments.join(" ").trim().to_string();
    if text.is_empty() {
        DocxText::Empty
    } else {
        DocxText::Text(text)
    }
}
