//! Key-value persistence for a promptport profile
//!
//! A profile is three keys: the prompt collection, the analytics event log
//! and the feedback flag. Values are whole JSON documents, rewritten on every
//! change.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, RwLock},
};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::{PromptPortError, Result};

pub mod prompts;
pub mod schema;

/// Key holding the JSON array of prompt records
pub const PROMPTS_KEY: &str = "prompts";
/// Key holding the JSON array of analytics events
pub const ANALYTICS_KEY: &str = "analytics";
/// Key set to "true" once the feedback modal has been shown
pub const FEEDBACK_SHOWN_KEY: &str = "feedbackShown";

/// String key-value storage shared by everything in a profile
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Handle passed to every component of a session
pub type SharedStore = Arc<dyn KeyValueStore>;

/// SQLite-backed store, one row per key
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(schema::SCHEMA)?;
        log::debug!("Opened profile database at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PromptPortError::Storage("database lock poisoned".into()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

/// In-memory store; clones share the same map
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| PromptPortError::Storage("memory store read".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PromptPortError::Storage("memory store write".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
