//! Search predicate and filtered list view
//!
//! `matches` is the raw predicate and treats an empty term as "no match".
//! `filter` and `view` sit one level up and skip the predicate entirely when
//! the term is empty, so an empty search shows everything.

use serde::Serialize;

use crate::db::prompts::Prompt;

/// Case-insensitive substring match against the text or the space-joined tags
pub fn matches(prompt: &Prompt, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }

    let needle = term.to_lowercase();
    prompt.text.to_lowercase().contains(&needle)
        || prompt.tags.join(" ").to_lowercase().contains(&needle)
}

/// Records matching `term` in collection order, each with its collection index
///
/// A term that is empty after trimming returns the whole collection.
pub fn filter<'a>(prompts: &'a [Prompt], term: &str) -> Vec<(usize, &'a Prompt)> {
    let term = term.trim();
    prompts
        .iter()
        .enumerate()
        .filter(|(_, prompt)| term.is_empty() || matches(prompt, term))
        .collect()
}

/// One row of the rendered list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEntry<'a> {
    /// Position in the append-ordered collection, used by edit and delete
    pub index:     usize,
    pub prompt:    &'a Prompt,
    pub timestamp: String,
    pub tags:      String,
}

/// The list as shown to the user: filtered, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<'a> {
    pub term:       String,
    pub entries:    Vec<ViewEntry<'a>>,
    /// A search is active and nothing matched
    pub no_matches: bool,
}

pub fn view<'a>(prompts: &'a [Prompt], term: &str) -> ListView<'a> {
    let term = term.trim();
    let entries: Vec<ViewEntry<'a>> = filter(prompts, term)
        .into_iter()
        .rev()
        .map(|(index, prompt)| ViewEntry {
            index,
            prompt,
            timestamp: prompt.display_timestamp(),
            tags: prompt.tags_display(),
        })
        .collect();

    ListView {
        term: term.to_string(),
        no_matches: !term.is_empty() && entries.is_empty(),
        entries,
    }
}
