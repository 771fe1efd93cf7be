//! Error types for promptport
//!
//! Every failure in this crate degrades to a user-visible notice. The error
//! enum carries enough structure for the RPC layer to pick a JSON-RPC code
//! and for the UI to show a friendly message.

use thiserror::Error;

/// Result type alias for promptport operations
pub type Result<T> = std::result::Result<T, PromptPortError>;

/// Main error type for promptport
#[derive(Debug, Error)]
pub enum PromptPortError {
    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid command arguments
    #[error("Invalid arguments for command '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// SQLite error
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Writing the collection (or another profile key) to storage failed.
    /// The in-memory state has already been updated when this is returned.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Positional access past the end of the collection
    #[error("Index {index} out of bounds for {len} prompts")]
    IndexOutOfBounds { index: usize, len: usize },

    /// No prompt with the given id
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// Backup payload does not have the expected shape
    #[error("Invalid backup file format: {0}")]
    InvalidBackup(String),

    /// Cloud drive transport or lookup failure
    #[error("Drive error: {0}")]
    Drive(String),

    /// Import source that is neither text nor DOCX
    #[error("Unsupported import file: {0}")]
    UnsupportedImport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error (catch-all)
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for PromptPortError {
    fn from(err: anyhow::Error) -> Self {
        PromptPortError::Other(err.to_string())
    }
}

impl From<String> for PromptPortError {
    fn from(err: String) -> Self {
        PromptPortError::Other(err)
    }
}

impl From<&str> for PromptPortError {
    fn from(err: &str) -> Self {
        PromptPortError::Other(err.to_string())
    }
}

impl PromptPortError {
    /// Get user-friendly error message for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            PromptPortError::CommandNotFound(cmd) => {
                format!("Command '{}' not found.", cmd)
            },
            PromptPortError::InvalidArgs { command, reason } => {
                format!("Invalid arguments for '{}': {}", command, reason)
            },
            PromptPortError::Storage(_) => {
                "Your change was applied but could not be saved to storage.".to_string()
            },
            PromptPortError::InvalidBackup(_) => "❌ Invalid backup file format.".to_string(),
            PromptPortError::Drive(_) => {
                "❌ Failed to access cloud drive. Please try again.".to_string()
            },
            PromptPortError::UnsupportedImport(name) => {
                format!("Cannot import '{}'. Choose a .txt or .docx file.", name)
            },
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            PromptPortError::CommandNotFound(_) => "command",
            PromptPortError::InvalidArgs { .. } => "arguments",
            PromptPortError::SerdeError(_) => "serialization",
            PromptPortError::DatabaseError(_) => "database",
            PromptPortError::IoError(_) => "io",
            PromptPortError::Storage(_) => "storage",
            PromptPortError::IndexOutOfBounds { .. } => "bounds",
            PromptPortError::PromptNotFound(_) => "not_found",
            PromptPortError::InvalidBackup(_) => "backup",
            PromptPortError::Drive(_) => "drive",
            PromptPortError::UnsupportedImport(_) => "import",
            PromptPortError::ConfigError(_) => "config",
            PromptPortError::Other(_) => "other",
        }
    }

    /// Map to a JSON-RPC 2.0 error code
    pub fn to_jsonrpc_code(&self) -> i32 {
        match self {
            PromptPortError::CommandNotFound(_) => -32601,
            PromptPortError::InvalidArgs { .. }
            | PromptPortError::IndexOutOfBounds { .. }
            | PromptPortError::PromptNotFound(_)
            | PromptPortError::UnsupportedImport(_) => -32602,
            _ => -32603,
        }
    }

    /// Shorthand for an `InvalidArgs` error
    pub fn invalid_args(command: &str, reason: impl Into<String>) -> Self {
        PromptPortError::InvalidArgs {
            command: command.to_string(),
            reason:  reason.into(),
        }
    }
}
