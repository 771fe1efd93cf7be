//! Local usage analytics
//!
//! Events are appended to a JSON array under the `analytics` key. Only the
//! 100 most recent are kept; older ones are evicted first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    db::{prompts::now_iso, SharedStore, ANALYTICS_KEY},
    errors::{PromptPortError, Result},
};

/// Maximum number of stored events
pub const MAX_EVENTS: usize = 100;

/// Number of feedback entries shown in the statistics
const RECENT_FEEDBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PromptSaved,
    ExportTxt,
    SearchPerformed,
    FeedbackSubmitted,
    BackupSuccess,
    RestoreSuccess,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PromptSaved => "prompt_saved",
            EventKind::ExportTxt => "export_txt",
            EventKind::SearchPerformed => "search_performed",
            EventKind::FeedbackSubmitted => "feedback_submitted",
            EventKind::BackupSuccess => "backup_success",
            EventKind::RestoreSuccess => "restore_success",
        }
    }
}

/// Fields stamped on every event
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub url:        String,
    pub user_agent: String,
}

/// A stored event; kind-specific fields land in `extra`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(default)]
    pub timestamp:    String,
    #[serde(default)]
    pub event:        String,
    #[serde(default)]
    pub url:          String,
    #[serde(default)]
    pub user_agent:   String,
    #[serde(default)]
    pub prompt_count: u64,
    #[serde(flatten)]
    pub extra:        Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub timestamp: String,
    pub feedback:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_events:    usize,
    pub prompts_saved:   usize,
    pub searches:        usize,
    pub exports:         usize,
    pub feedback:        usize,
    /// Up to five most recent, oldest first
    pub recent_feedback: Vec<FeedbackEntry>,
}

pub struct AnalyticsLog {
    store:   SharedStore,
    context: ClientContext,
}

impl AnalyticsLog {
    pub fn new(store: SharedStore, context: ClientContext) -> Self {
        Self { store, context }
    }

    /// Append one event and trim the log to `MAX_EVENTS`
    ///
    /// Keys in `extra` override the common fields of the same name.
    pub fn record(&self, kind: EventKind, prompt_count: usize, extra: Map<String, Value>) -> Result<()> {
        let mut event = Map::new();
        event.insert("timestamp".into(), Value::String(now_iso()));
        event.insert("event".into(), Value::String(kind.as_str().into()));
        event.insert("url".into(), Value::String(self.context.url.clone()));
        event.insert("userAgent".into(), Value::String(self.context.user_agent.clone()));
        event.insert("promptCount".into(), Value::from(prompt_count));
        event.extend(extra);

        let mut events = self.raw_events();
        events.push(Value::Object(event));
        if events.len() > MAX_EVENTS {
            events.drain(..events.len() - MAX_EVENTS);
        }

        let json = serde_json::to_string(&events)?;
        self.store
            .set(ANALYTICS_KEY, &json)
            .map_err(|e| PromptPortError::Storage(e.to_string()))
    }

    /// Stored events, oldest first. Entries that do not decode are skipped.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.raw_events()
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }

    pub fn stats(&self) -> UsageStats {
        let events = self.events();
        let count = |kind: EventKind| events.iter().filter(|e| e.event == kind.as_str()).count();

        let feedback: Vec<FeedbackEntry> = events
            .iter()
            .filter(|e| e.event == EventKind::FeedbackSubmitted.as_str())
            .map(|e| FeedbackEntry {
                timestamp: e.timestamp.clone(),
                feedback:  e
                    .extra
                    .get("feedback")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();
        let skip = feedback.len().saturating_sub(RECENT_FEEDBACK);

        UsageStats {
            total_events: events.len(),
            prompts_saved: count(EventKind::PromptSaved),
            searches: count(EventKind::SearchPerformed),
            exports: count(EventKind::ExportTxt),
            feedback: feedback.len(),
            recent_feedback: feedback.into_iter().skip(skip).collect(),
        }
    }

    /// Pretty-printed JSON array of the raw stored events
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.raw_events())?)
    }

    fn raw_events(&self) -> Vec<Value> {
        match self.store.get(ANALYTICS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Stored analytics are corrupt, starting over: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read analytics: {}", e);
                Vec::new()
            },
        }
    }
}

/// `promptport_analytics_<YYYY-MM-DD>.json`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("promptport_analytics_{}.json", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::db::{KeyValueStore, MemoryStore};

    fn log_with_store() -> (AnalyticsLog, MemoryStore) {
        let store = MemoryStore::new();
        let log = AnalyticsLog::new(
            Arc::new(store.clone()),
            ClientContext {
                url:        "promptport://test".into(),
                user_agent: "tests".into(),
            },
        );
        (log, store)
    }

    fn extra(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_record_stamps_common_fields() {
        let (log, _) = log_with_store();
        log.record(EventKind::PromptSaved, 3, extra(json!({"textLength": 5, "tagCount": 1})))
            .unwrap();

        let events = log.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event, "prompt_saved");
        assert_eq!(event.url, "promptport://test");
        assert_eq!(event.user_agent, "tests");
        assert_eq!(event.prompt_count, 3);
        assert_eq!(event.extra["textLength"], json!(5));
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn test_extra_fields_override_common_ones() {
        let (log, store) = log_with_store();
        log.record(EventKind::ExportTxt, 1, extra(json!({"promptCount": 9})))
            .unwrap();

        let raw = store.get(ANALYTICS_KEY).unwrap().unwrap();
        let stored: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[0]["promptCount"], json!(9));
        assert_eq!(stored[0].as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_log_never_exceeds_cap_and_evicts_oldest() {
        let (log, _) = log_with_store();
        for i in 0..(MAX_EVENTS + 25) {
            log.record(EventKind::SearchPerformed, i, Map::new()).unwrap();
        }

        let events = log.events();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events[0].prompt_count, 25);
        assert_eq!(events[MAX_EVENTS - 1].prompt_count, (MAX_EVENTS + 24) as u64);
    }

    #[test]
    fn test_corrupt_log_starts_over() {
        let (log, store) = log_with_store();
        store.set(ANALYTICS_KEY, "not json").unwrap();
        assert!(log.events().is_empty());

        log.record(EventKind::PromptSaved, 0, Map::new()).unwrap();
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn test_stats() {
        let (log, _) = log_with_store();
        log.record(EventKind::PromptSaved, 1, Map::new()).unwrap();
        log.record(EventKind::PromptSaved, 2, Map::new()).unwrap();
        log.record(EventKind::SearchPerformed, 2, extra(json!({"searchTerm": "x"})))
            .unwrap();
        log.record(EventKind::ExportTxt, 2, Map::new()).unwrap();
        for i in 0..7 {
            log.record(
                EventKind::FeedbackSubmitted,
                2,
                extra(json!({"feedback": format!("note {}", i)})),
            )
            .unwrap();
        }

        let stats = log.stats();
        assert_eq!(stats.total_events, 11);
        assert_eq!(stats.prompts_saved, 2);
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.exports, 1);
        assert_eq!(stats.feedback, 7);
        let recent: Vec<&str> = stats.recent_feedback.iter().map(|f| f.feedback.as_str()).collect();
        assert_eq!(recent, vec!["note 2", "note 3", "note 4", "note 5", "note 6"]);
    }

    #[test]
    fn test_export_json_is_array() {
        let (log, _) = log_with_store();
        log.record(EventKind::BackupSuccess, 4, extra(json!({"service": "folder"})))
            .unwrap();
        let exported: Value = serde_json::from_str(&log.export_json().unwrap()).unwrap();
        assert_eq!(exported.as_array().unwrap().len(), 1);
        assert_eq!(exported[0]["service"], json!("folder"));
    }

    #[test]
    fn test_export_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 11, 2, 23, 59, 0).unwrap();
        assert_eq!(export_file_name(now), "promptport_analytics_2024-11-02.json");
    }
}
