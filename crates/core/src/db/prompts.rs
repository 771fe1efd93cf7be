use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{KeyValueStore, PROMPTS_KEY};
use crate::errors::{PromptPortError, Result};

/// Shown wherever a record has no usable timestamp
pub const UNKNOWN_DATE: &str = "Unknown date";
/// Shown wherever a record has no tags
pub const NO_TAGS: &str = "No tags";

/// Local display format, e.g. `1/15/2024, 3:04:05 PM`
const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// A saved prompt
///
/// Decoding is lenient: stored or restored data may be missing fields or
/// carry a malformed `tags` value, and still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id:        String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text:      String,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags:      Vec<String>,
    /// ISO-8601, refreshed on every edit
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Prompt {
    /// Fresh record with a new id and the current time
    pub fn new(text: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: new_prompt_id(),
            text: text.into(),
            tags,
            timestamp: Some(now_iso()),
        }
    }

    /// Decode one record-shaped JSON value
    ///
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Timestamp in local time, or `Unknown date`
    pub fn display_timestamp(&self) -> String {
        display_timestamp(self.timestamp.as_deref())
    }

    /// Tags joined by `", "`, or `No tags`
    pub fn tags_display(&self) -> String {
        if self.tags.is_empty() {
            NO_TAGS.to_string()
        } else {
            self.tags.join(", ")
        }
    }
}

/// Split a raw comma-separated tag string
///
/// Entries are trimmed and empty ones dropped. Order and duplicates are kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Time-ordered unique id
///
/// UUIDv7 keeps ids sortable by creation time while staying distinct for
/// calls within the same millisecond.
pub fn new_prompt_id() -> String {
    Uuid::now_v7().to_string()
}

/// Current UTC time as ISO-8601 with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render an ISO timestamp in local time
pub fn display_timestamp(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Read the collection from storage
///
/// Never fails: absent, unreadable or corrupt data yields an empty collection.
/// Entries that are not JSON objects are skipped.
pub fn load_prompts(store: &dyn KeyValueStore) -> Vec<Prompt> {
    let raw = match store.get(PROMPTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Failed to read stored prompts, starting empty: {}", e);
            return Vec::new();
        },
    };

    let entries: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Stored prompts are not a JSON array, starting empty: {}", e);
            return Vec::new();
        },
    };

    let total = entries.len();
    let prompts: Vec<Prompt> = entries.into_iter().filter_map(Prompt::from_value).collect();
    if prompts.len() != total {
        log::warn!("Skipped {} malformed stored prompts", total - prompts.len());
    }
    prompts
}

/// Write the whole collection to storage
pub fn save_prompts(store: &dyn KeyValueStore, prompts: &[Prompt]) -> Result<()> {
    let json = serde_json::to_string(prompts)?;
    store
        .set(PROMPTS_KEY, &json)
        .map_err(|e| PromptPortError::Storage(e.to_string()))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Anything other than an array of strings becomes an empty tag list
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        _ => Vec::new(),
    })
}
