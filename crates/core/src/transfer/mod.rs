//! Plain-text export and import
//!
//! Export writes one paragraph per record in the structured line format.
//! Import reads that format back line by line, falls back to one record per
//! plain line, and accepts a best-effort text scrape of DOCX bytes.

use std::path::Path;

use serde::Serialize;

use crate::errors::{PromptPortError, Result};

pub mod docx;
pub mod export;
pub mod import;

pub use export::{export_file_name, export_text, format_line};
pub use import::{parse_content, parse_structured_line, ParsedPrompt};

/// Source format of an import file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Txt,
    Docx,
}

impl ImportKind {
    /// Pick the format from a file name's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt") => Ok(ImportKind::Txt),
            Some("docx") => Ok(ImportKind::Docx),
            _ => Err(PromptPortError::UnsupportedImport(
                path.display().to_string(),
            )),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImportKind::Txt => "TXT",
            ImportKind::Docx => "DOCX",
        }
    }
}

/// What an import did, each case with its own user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported { count: usize, kind: ImportKind },
    /// No non-blank lines in the content
    NothingFound,
    /// No text-run tags anywhere in the DOCX bytes
    DocxUnreadable,
    /// Text-run tags found, but they held no text
    DocxEmpty,
}

impl ImportOutcome {
    pub fn imported(&self) -> usize {
        match self {
            ImportOutcome::Imported { count, .. } => *count,
            _ => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ImportOutcome::Imported { count, kind } => format!(
                "Successfully imported {} prompts from {} file!",
                count,
                kind.label()
            ),
            ImportOutcome::NothingFound => "No valid content found to import.".to_string(),
            ImportOutcome::DocxUnreadable => {
                "Could not parse DOCX file. Please try converting to TXT format.".to_string()
            },
            ImportOutcome::DocxEmpty => "Could not extract text from DOCX file.".to_string(),
        }
    }
}
