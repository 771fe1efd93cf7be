//! Line-oriented import
//!
//! Structured line grammar:
//!
//! ```text
//! line      := "[" timestamp "]" ws* text ws* "(Tags:" ws* tags ")"
//! timestamp := any text up to the first "]"
//! text      := any text up to the first "(Tags:" after the timestamp
//! tags      := everything up to the final ")" of the line
//! ```
//!
//! The text capture stops at the first `(Tags:`, so a prompt whose own text
//! contains that marker does not survive a round trip. Import also splits on
//! newlines, so a prompt with a line break in its text comes back as two
//! records.

use crate::db::prompts::{parse_tags, NO_TAGS};

const TAGS_MARKER: &str = "(Tags:";

/// One record recovered from import text, before it gets an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPrompt {
    pub text:             String,
    pub tags:             Vec<String>,
    /// Bracketed timestamp from a structured line. Parsed but never restored.
    pub source_timestamp: Option<String>,
}

impl ParsedPrompt {
    fn plain(line: &str) -> Self {
        Self {
            text:             line.to_string(),
            tags:             Vec::new(),
            source_timestamp: None,
        }
    }
}

/// Match one trimmed line against the structured export format
pub fn parse_structured_line(line: &str) -> Option<ParsedPrompt> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let timestamp = &rest[..close];

    let body = rest[close + 1..].strip_suffix(')')?;
    let marker = body.find(TAGS_MARKER)?;
    let text = body[..marker].trim();
    let tags_raw = body[marker + TAGS_MARKER.len()..].trim_start();

    let tags = if tags_raw == NO_TAGS {
        Vec::new()
    } else {
        parse_tags(tags_raw)
    };

    Some(ParsedPrompt {
        text: text.to_string(),
        tags,
        source_timestamp: Some(timestamp.to_string()),
    })
}

/// Every non-blank line becomes one record: structured when it matches,
/// otherwise the whole trimmed line with no tags
pub fn parse_content(content: &str) -> Vec<ParsedPrompt> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| parse_structured_line(line).unwrap_or_else(|| ParsedPrompt::plain(line)))
        .collect()
}
