//! The prompt library: the authoritative in-memory collection
//!
//! Every successful mutation rewrites the whole collection to storage before
//! returning. The in-memory change is never rolled back: if the write fails
//! the caller gets `PromptPortError::Storage` and the session keeps running
//! on the updated collection.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    db::{
        prompts::{self, parse_tags, Prompt},
        SharedStore,
    },
    errors::{PromptPortError, Result},
    search::{self, ListView},
    transfer::{
        docx::{self, DocxText},
        import, ImportKind, ImportOutcome, ParsedPrompt,
    },
};

/// Shown as the last-saved time of an empty library
pub const NOT_AVAILABLE: &str = "N/A";

/// How an edit addresses its record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRef<'a> {
    Index(usize),
    Id(&'a str),
}

/// Counts shown in the summary panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count:      usize,
    /// Distinct trimmed, non-empty tags
    pub tag_count:  usize,
    pub last_saved: String,
}

pub struct PromptLibrary {
    store:   SharedStore,
    prompts: Vec<Prompt>,
}

impl PromptLibrary {
    /// Load the collection once from storage
    pub fn load(store: SharedStore) -> Self {
        let prompts = prompts::load_prompts(store.as_ref());
        log::info!("Loaded {} prompts", prompts.len());
        Self { store, prompts }
    }

    /// Records in append order, oldest first
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Save a new prompt
    ///
    /// Returns `Ok(None)` without touching anything when the trimmed text is
    /// empty.
    pub fn create(&mut self, text: &str, tags_raw: &str) -> Result<Option<Prompt>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let prompt = Prompt::new(text, parse_tags(tags_raw));
        self.prompts.push(prompt.clone());
        self.persist()?;
        Ok(Some(prompt))
    }

    /// Replace the text and tags of one record and refresh its timestamp
    ///
    /// Returns `Ok(None)` and leaves the record unchanged when the trimmed
    /// text is empty.
    pub fn edit(&mut self, target: PromptRef<'_>, text: &str, tags_raw: &str) -> Result<Option<Prompt>> {
        let index = self.resolve(target)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let prompt = &mut self.prompts[index];
        prompt.text = text.to_string();
        prompt.tags = parse_tags(tags_raw);
        prompt.timestamp = Some(prompts::now_iso());
        let updated = prompt.clone();

        self.persist()?;
        Ok(Some(updated))
    }

    /// Remove exactly the record at `index`
    pub fn delete(&mut self, index: usize) -> Result<Prompt> {
        if index >= self.prompts.len() {
            return Err(PromptPortError::IndexOutOfBounds {
                index,
                len: self.prompts.len(),
            });
        }

        let removed = self.prompts.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Replace the entire collection
    ///
    /// `incoming` must be a JSON array whose entries are all objects. Anything
    /// else is rejected before the current collection is touched. Entries are
    /// normalized but not revalidated (an empty `text` is accepted).
    pub fn restore(&mut self, incoming: &Value) -> Result<usize> {
        let entries = incoming
            .as_array()
            .ok_or_else(|| PromptPortError::InvalidBackup("prompts is not an array".into()))?;

        let restored = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Prompt::from_value(entry.clone()).ok_or_else(|| {
                    PromptPortError::InvalidBackup(format!("entry {} is not a prompt record", i))
                })
            })
            .collect::<Result<Vec<Prompt>>>()?;

        self.prompts = restored;
        log::info!("Restored collection of {} prompts", self.prompts.len());
        self.persist()?;
        Ok(self.prompts.len())
    }

    /// Append parsed import entries as new records
    ///
    /// Each entry gets a fresh id and the current time. Nothing is written
    /// when there is nothing to add.
    pub fn append_imported(&mut self, parsed: Vec<ParsedPrompt>) -> Result<usize> {
        if parsed.is_empty() {
            return Ok(0);
        }

        let count = parsed.len();
        self.prompts
            .extend(parsed.into_iter().map(|p| Prompt::new(p.text, p.tags)));
        self.persist()?;
        Ok(count)
    }

    /// Import file content of the given kind
    ///
    /// DOCX bytes go through the text scrape first; the result (or the text
    /// file) then runs through the line importer.
    pub fn import(&mut self, kind: ImportKind, bytes: &[u8]) -> Result<ImportOutcome> {
        let content = match kind {
            ImportKind::Txt => String::from_utf8_lossy(bytes).into_owned(),
            ImportKind::Docx => match docx::extract_text(bytes) {
                DocxText::Text(text) => text,
                DocxText::NoTextRuns => return Ok(ImportOutcome::DocxUnreadable),
                DocxText::Empty => return Ok(ImportOutcome::DocxEmpty),
            },
        };

        let count = self.append_imported(import::parse_content(&content))?;
        log::info!("Imported {} prompts from {} content", count, kind.label());

        Ok(if count == 0 {
            ImportOutcome::NothingFound
        } else {
            ImportOutcome::Imported { count, kind }
        })
    }

    /// Filtered, newest-first list
    pub fn view(&self, term: &str) -> ListView<'_> {
        search::view(&self.prompts, term)
    }

    pub fn summary(&self) -> Summary {
        let tags: HashSet<&str> = self
            .prompts
            .iter()
            .flat_map(|p| p.tags.iter())
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        let last_saved = match self.prompts.last() {
            Some(last) if last.timestamp.is_some() => last.display_timestamp(),
            _ => NOT_AVAILABLE.to_string(),
        };

        Summary {
            count: self.prompts.len(),
            tag_count: tags.len(),
            last_saved,
        }
    }

    fn resolve(&self, target: PromptRef<'_>) -> Result<usize> {
        match target {
            PromptRef::Index(index) if index < self.prompts.len() => Ok(index),
            PromptRef::Index(index) => Err(PromptPortError::IndexOutOfBounds {
                index,
                len: self.prompts.len(),
            }),
            PromptRef::Id(id) => self
                .prompts
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| PromptPortError::PromptNotFound(id.to_string())),
        }
    }

    fn persist(&self) -> Result<()> {
        prompts::save_prompts(self.store.as_ref(), &self.prompts).inspect_err(|e| {
            log::warn!("Failed to persist {} prompts: {}", self.prompts.len(), e);
        })
    }
}
