//! Application session
//!
//! Owns the library, the analytics log, the feedback gate and the drive for
//! one profile, plus the live search term. Every user action goes through a
//! `&mut Session`, so no operation ever observes a half-applied change.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    analytics::{self, AnalyticsLog, ClientContext, EventKind, UsageStats},
    backup::{self, CloudDrive, DriveFile, FolderDrive},
    config::{Config, StorageKind},
    db::{prompts::Prompt, MemoryStore, SharedStore, SqliteStore},
    errors::{PromptPortError, Result},
    feedback::FeedbackGate,
    library::{PromptLibrary, PromptRef},
    runtime,
    transfer::{self, ImportKind, ImportOutcome},
};

/// Result of saving a new prompt
#[derive(Debug, Default)]
pub struct CreateOutcome {
    /// `None` when the text was blank
    pub prompt:         Option<Prompt>,
    /// Set when the feedback modal should be shown after this delay
    pub feedback_delay: Option<Duration>,
    /// The record was added but writing the collection failed
    pub persist_error:  Option<PromptPortError>,
}

/// A file written to the export directory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub path:      PathBuf,
    pub file_name: String,
    pub count:     usize,
}

/// What a restore would do, shown before the user confirms
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePreview {
    pub file_id:  String,
    pub current:  usize,
    pub incoming: usize,
}

pub struct Session {
    config:      Config,
    library:     PromptLibrary,
    analytics:   AnalyticsLog,
    feedback:    FeedbackGate,
    drive:       FolderDrive,
    search_term: String,
}

impl Session {
    /// Open the profile described by `config`
    pub fn open(config: Config) -> Result<Self> {
        let store: SharedStore = match config.storage {
            StorageKind::Sqlite => Arc::new(SqliteStore::open(&config.database_path())?),
            StorageKind::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: SharedStore) -> Self {
        let context = ClientContext {
            url:        config.client_url.clone(),
            user_agent: config.user_agent.clone(),
        };

        Self {
            library: PromptLibrary::load(store.clone()),
            analytics: AnalyticsLog::new(store.clone(), context),
            feedback: FeedbackGate::new(store, Duration::from_millis(config.feedback_delay_ms)),
            drive: FolderDrive::new(config.drive_dir.clone()),
            search_term: String::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn library(&self) -> &PromptLibrary {
        &self.library
    }

    pub fn analytics(&self) -> &AnalyticsLog {
        &self.analytics
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    // ========================================
    // Search
    // ========================================

    /// Set the live search term (trimmed)
    ///
    /// `track` records a `search_performed` event, as an explicit search does.
    /// Live typing updates the term without tracking.
    pub fn set_search_term(&mut self, term: &str, track: bool) {
        self.search_term = term.trim().to_string();
        if track {
            self.track(
                EventKind::SearchPerformed,
                json!({ "searchTerm": self.search_term }),
            );
        }
    }

    pub fn clear_search(&mut self) {
        self.search_term.clear();
    }

    // ========================================
    // Prompt mutations
    // ========================================

    pub fn create_prompt(&mut self, text: &str, tags_raw: &str) -> Result<CreateOutcome> {
        let (prompt, persist_error) = match self.library.create(text, tags_raw) {
            Ok(Some(prompt)) => (prompt, None),
            Ok(None) => return Ok(CreateOutcome::default()),
            // The record stays in memory, so it still counts as saved
            Err(err @ PromptPortError::Storage(_)) => match self.library.prompts().last() {
                Some(prompt) => (prompt.clone(), Some(err)),
                None => return Err(err),
            },
            Err(err) => return Err(err),
        };

        self.track(
            EventKind::PromptSaved,
            json!({
                "textLength": prompt.text.chars().count(),
                "tagCount": prompt.tags.len(),
                "totalPrompts": self.library.len(),
            }),
        );

        let feedback_delay = self
            .feedback
            .check_for_prompt(self.library.len())
            .unwrap_or_else(|e| {
                log::warn!("Failed to record feedback flag: {}", e);
                None
            });

        Ok(CreateOutcome {
            prompt: Some(prompt),
            feedback_delay,
            persist_error,
        })
    }

    pub fn update_prompt(&mut self, target: PromptRef<'_>, text: &str, tags_raw: &str) -> Result<Option<Prompt>> {
        self.library.edit(target, text, tags_raw)
    }

    pub fn delete_prompt(&mut self, index: usize) -> Result<Prompt> {
        self.library.delete(index)
    }

    // ========================================
    // Export / import
    // ========================================

    /// Write the text export into the export directory
    pub fn export_text(&self) -> Result<ExportedFile> {
        let count = self.library.len();
        self.track(EventKind::ExportTxt, json!({ "promptCount": count }));

        let file_name = transfer::export_file_name(Utc::now());
        let body = transfer::export_text(self.library.prompts());
        let path = self.write_export(&file_name, body.as_bytes())?;

        Ok(ExportedFile {
            path,
            file_name,
            count,
        })
    }

    /// Import a `.txt` or `.docx` file
    pub fn import_file(&mut self, path: &Path) -> Result<ImportOutcome> {
        let kind = ImportKind::from_path(path)?;
        let bytes = std::fs::read(path)?;
        self.import_content(kind, &bytes)
    }

    pub fn import_content(&mut self, kind: ImportKind, bytes: &[u8]) -> Result<ImportOutcome> {
        self.library.import(kind, bytes)
    }

    // ========================================
    // Cloud backup
    // ========================================

    pub fn backup(&self) -> Result<DriveFile> {
        let file = runtime::block_on(backup::create_backup(&self.drive, self.library.prompts()))
            .inspect_err(|e| log::error!("Backup error: {}", e))?;

        self.track(
            EventKind::BackupSuccess,
            json!({ "promptCount": self.library.len(), "service": self.drive.name() }),
        );
        Ok(file)
    }

    pub fn list_backups(&self) -> Result<Vec<DriveFile>> {
        runtime::block_on(backup::list_backups(&self.drive))
            .inspect_err(|e| log::error!("Restore error: {}", e))
    }

    /// Download and validate a backup without applying it
    pub fn restore_preview(&self, file_id: &str) -> Result<RestorePreview> {
        let incoming = self.fetch_backup(file_id)?;
        Ok(RestorePreview {
            file_id:  file_id.to_string(),
            current:  self.library.len(),
            incoming: incoming.as_array().map_or(0, Vec::len),
        })
    }

    /// Replace the whole collection with a backup's prompts
    ///
    /// Download or format failures leave the collection untouched.
    pub fn restore(&mut self, file_id: &str) -> Result<usize> {
        let incoming = self.fetch_backup(file_id)?;
        let restored = self.library.restore(&incoming)?;

        self.track(
            EventKind::RestoreSuccess,
            json!({ "promptCount": restored, "service": self.drive.name() }),
        );
        Ok(restored)
    }

    fn fetch_backup(&self, file_id: &str) -> Result<Value> {
        runtime::block_on(backup::fetch_backup(&self.drive, file_id))
            .inspect_err(|e| log::error!("Restore error: {}", e))
    }

    // ========================================
    // Analytics and feedback
    // ========================================

    pub fn analytics_stats(&self) -> UsageStats {
        self.analytics.stats()
    }

    pub fn export_analytics(&self) -> Result<ExportedFile> {
        let file_name = analytics::export_file_name(Utc::now());
        let body = self.analytics.export_json()?;
        let path = self.write_export(&file_name, body.as_bytes())?;

        Ok(ExportedFile {
            path,
            file_name,
            count: self.analytics.events().len(),
        })
    }

    /// Record feedback text; blank feedback is ignored
    pub fn submit_feedback(&self, feedback: &str) -> bool {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return false;
        }
        self.track(EventKind::FeedbackSubmitted, json!({ "feedback": feedback }));
        true
    }

    /// Analytics never fail the action that triggered them
    fn track(&self, kind: EventKind, extra: Value) {
        let extra = match extra {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Err(e) = self.analytics.record(kind, self.library.len(), extra) {
            log::warn!("Failed to record {} event: {}", kind.as_str(), e);
        }
    }

    fn write_export(&self, file_name: &str, body: &[u8]) -> Result<PathBuf> {
        let dir = &self.config.export_dir;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, body).map_err(|e| {
            PromptPortError::IoError(std::io::Error::new(
                e.kind(),
                format!("writing {}: {}", path.display(), e),
            ))
        })?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }
}
