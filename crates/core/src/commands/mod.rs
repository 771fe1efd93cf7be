//! Command registry and dispatch system
//!
//! Commands are registered as "category.action" (e.g., "prompts.create",
//! "backup.restore") and dispatched to handler functions that act on the
//! open [`Session`].
//!
//! ## Adding a new command
//!
//! 1. Create handler function: `pub fn my_command(session: &mut Session, args: Value) -> Result<Value>`
//! 2. Register in `REGISTRY`: `("category.action", my_command as CommandHandler)`
//! 3. Add tests for the command

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::{
    errors::{PromptPortError, Result},
    session::Session,
};

pub mod analytics;
pub mod backup;
pub mod prompts;

/// Type alias for command handler functions
///
/// All command handlers take the session and a JSON Value (arguments) and
/// return a Result<Value>
pub type CommandHandler = fn(&mut Session, Value) -> Result<Value>;

/// Static command registry
///
/// Maps command names to handler functions. Initialized lazily on first access.
static REGISTRY: Lazy<HashMap<&'static str, CommandHandler>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert("ping", ping as CommandHandler);

    map.insert("prompts.list", prompts::list as CommandHandler);
    map.insert("prompts.create", prompts::create as CommandHandler);
    map.insert("prompts.update", prompts::update as CommandHandler);
    map.insert("prompts.delete", prompts::delete as CommandHandler);
    map.insert("prompts.search", prompts::search as CommandHandler);
    map.insert("prompts.clear_search", prompts::clear_search as CommandHandler);
    map.insert("prompts.summary", prompts::summary as CommandHandler);
    map.insert("prompts.export", prompts::export as CommandHandler);
    map.insert("prompts.import", prompts::import as CommandHandler);

    map.insert("backup.create", backup::create as CommandHandler);
    map.insert("backup.list", backup::list as CommandHandler);
    map.insert("backup.restore", backup::restore as CommandHandler);

    map.insert("analytics.stats", analytics::stats as CommandHandler);
    map.insert("analytics.export", analytics::export as CommandHandler);
    map.insert("feedback.submit", analytics::submit_feedback as CommandHandler);

    map
});

/// Dispatch a command by name
///
/// Looks up the command in the registry and executes it against the session.
pub fn dispatch(session: &mut Session, command: &str, args: Value) -> Result<Value> {
    match REGISTRY.get(command) {
        Some(handler) => handler(session, args),
        None => Err(PromptPortError::CommandNotFound(command.to_string())),
    }
}

/// List all available commands
///
/// Returns a sorted list of all registered command names.
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = REGISTRY.keys().map(|&k| k.to_string()).collect();
    commands.sort();
    commands
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Required string argument
pub(crate) fn required_str<'a>(args: &'a Value, command: &str, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PromptPortError::invalid_args(command, format!("Missing {}", key)))
}

/// Optional string argument; present but not a string is an error
pub(crate) fn optional_str<'a>(args: &'a Value, command: &str, key: &str) -> Result<Option<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(PromptPortError::invalid_args(
            command,
            format!("{} must be a string", key),
        )),
    }
}

pub(crate) fn optional_index(args: &Value, command: &str, key: &str) -> Result<Option<usize>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| {
                PromptPortError::invalid_args(command, format!("{} must be a non-negative integer", key))
            }),
    }
}

pub(crate) fn optional_bool(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

// ============================================================================
// Test Commands
// ============================================================================

/// Ping command - simple test to verify command dispatch works
///
/// Returns the input arguments with an added "pong" field.
///
/// # Example
/// ```json
/// // Input:  {"message": "hello"}
/// // Output: {"message": "hello", "pong": true}
/// ```
fn ping(_session: &mut Session, args: Value) -> Result<Value> {
    let mut result = match args {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    result.insert("pong".to_string(), Value::Bool(true));
    Ok(Value::Object(result))
}
