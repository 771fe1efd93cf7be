//! Runtime configuration
//!
//! Defaults come from the platform data directory. A `.env` file (if any) and
//! `PROMPTPORT_*` environment variables override them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{PromptPortError, Result};

/// Delay before the feedback modal is shown, in milliseconds
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 2000;

/// Analytics `url` value when none is configured
pub const DEFAULT_CLIENT_URL: &str = "promptport://local";

/// Which key-value backend holds the profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// SQLite file under `data_dir`
    #[default]
    Sqlite,
    /// Process-local map, nothing survives a restart
    Memory,
}

impl std::str::FromStr for StorageKind {
    type Err = PromptPortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "memory" => Ok(StorageKind::Memory),
            other => Err(PromptPortError::ConfigError(format!(
                "Unknown storage kind '{}' (expected sqlite or memory)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir:          PathBuf,
    pub storage:           StorageKind,
    /// Folder that backs the cloud drive
    pub drive_dir:         PathBuf,
    /// Where export files are written
    pub export_dir:        PathBuf,
    pub feedback_delay_ms: u64,
    pub client_url:        String,
    pub user_agent:        String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            drive_dir: data_dir.join("drive"),
            data_dir,
            storage: StorageKind::default(),
            export_dir: PathBuf::from("."),
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
            client_url: DEFAULT_CLIENT_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    ///
    /// `drive_dir` follows `data_dir` unless it is set explicitly.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup("PROMPTPORT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
            config.drive_dir = config.data_dir.join("drive");
        }
        if let Some(kind) = lookup("PROMPTPORT_STORAGE") {
            config.storage = kind.parse()?;
        }
        if let Some(dir) = lookup("PROMPTPORT_DRIVE_DIR") {
            config.drive_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PROMPTPORT_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(delay) = lookup("PROMPTPORT_FEEDBACK_DELAY_MS") {
            config.feedback_delay_ms = delay.trim().parse().map_err(|_| {
                PromptPortError::ConfigError(format!(
                    "PROMPTPORT_FEEDBACK_DELAY_MS must be a number of milliseconds, got '{}'",
                    delay
                ))
            })?;
        }
        if let Some(url) = lookup("PROMPTPORT_CLIENT_URL") {
            config.client_url = url;
        }
        if let Some(agent) = lookup("PROMPTPORT_USER_AGENT") {
            config.user_agent = agent;
        }

        Ok(config)
    }

    /// Config rooted in one directory with in-process defaults elsewhere
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        Self {
            drive_dir: data_dir.join("drive"),
            export_dir: data_dir.join("exports"),
            data_dir,
            ..Config::default()
        }
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("promptport.db")
    }
}

/// Platform data directory for promptport (~/.local/share/promptport on Linux)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptport")
}

fn default_user_agent() -> String {
    format!("promptport/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(config.feedback_delay_ms, 2000);
        assert_eq!(config.client_url, DEFAULT_CLIENT_URL);
        assert!(config.user_agent.starts_with("promptport/"));
        assert!(config.data_dir.ends_with("promptport"));
        assert_eq!(config.drive_dir, config.data_dir.join("drive"));
    }

    #[test]
    fn test_data_dir_moves_drive_dir() {
        let config = Config::from_lookup(lookup_from(&[("PROMPTPORT_DATA_DIR", "/tmp/pp")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pp"));
        assert_eq!(config.drive_dir, PathBuf::from("/tmp/pp/drive"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/pp/promptport.db"));
    }

    #[test]
    fn test_explicit_drive_dir_wins() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROMPTPORT_DATA_DIR", "/tmp/pp"),
            ("PROMPTPORT_DRIVE_DIR", "/mnt/drive"),
        ]))
        .unwrap();
        assert_eq!(config.drive_dir, PathBuf::from("/mnt/drive"));
    }

    #[test]
    fn test_storage_kind_parse() {
        let config = Config::from_lookup(lookup_from(&[("PROMPTPORT_STORAGE", "Memory")])).unwrap();
        assert_eq!(config.storage, StorageKind::Memory);

        let err = Config::from_lookup(lookup_from(&[("PROMPTPORT_STORAGE", "redis")])).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_invalid_delay_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("PROMPTPORT_FEEDBACK_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, PromptPortError::ConfigError(_)));
    }

    #[test]
    fn test_with_data_dir() {
        let config = Config::with_data_dir("/tmp/profile");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/profile/exports"));
        assert_eq!(config.drive_dir, PathBuf::from("/tmp/profile/drive"));
    }
}
