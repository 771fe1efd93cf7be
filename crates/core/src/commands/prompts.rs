use std::path::Path;

use serde_json::{json, Value};

use super::{optional_bool, optional_index, optional_str, required_str};
use crate::{
    errors::{PromptPortError, Result},
    library::PromptRef,
    session::Session,
    transfer::{ImportKind, ImportOutcome},
};

/// The list as currently rendered, plus the summary panel
///
/// An explicit `term` overrides the session's live search term.
pub fn list(session: &mut Session, args: Value) -> Result<Value> {
    let term = optional_str(&args, "prompts.list", "term")?
        .unwrap_or(session.search_term())
        .to_string();
    render(session, &term)
}

pub fn create(session: &mut Session, args: Value) -> Result<Value> {
    let text = required_str(&args, "prompts.create", "text")?;
    let tags = optional_str(&args, "prompts.create", "tags")?.unwrap_or_default();

    // A failed write is reported in the result so the feedback offer survives
    let outcome = session.create_prompt(text, tags)?;
    Ok(json!({
        "saved": outcome.prompt.is_some(),
        "prompt": outcome.prompt,
        "feedbackDelayMs": outcome.feedback_delay.map(|d| d.as_millis() as u64),
        "storageError": outcome.persist_error.as_ref().map(PromptPortError::user_message),
    }))
}

/// Edit by `index` or `id`
pub fn update(session: &mut Session, args: Value) -> Result<Value> {
    let text = required_str(&args, "prompts.update", "text")?;
    let tags = optional_str(&args, "prompts.update", "tags")?.unwrap_or_default();

    let index = optional_index(&args, "prompts.update", "index")?;
    let id = optional_str(&args, "prompts.update", "id")?;
    let target = match (index, id) {
        (Some(index), _) => PromptRef::Index(index),
        (None, Some(id)) => PromptRef::Id(id),
        (None, None) => {
            return Err(PromptPortError::invalid_args(
                "prompts.update",
                "Missing index or id",
            ))
        },
    };

    let updated = session.update_prompt(target, text, tags)?;
    Ok(json!({ "updated": updated.is_some(), "prompt": updated }))
}

pub fn delete(session: &mut Session, args: Value) -> Result<Value> {
    let index = optional_index(&args, "prompts.delete", "index")?
        .ok_or_else(|| PromptPortError::invalid_args("prompts.delete", "Missing index"))?;

    let removed = session.delete_prompt(index)?;
    Ok(json!({ "success": true, "prompt": removed }))
}

/// Set the search term and return the filtered list
///
/// `track: false` is used for live typing and skips the analytics event.
pub fn search(session: &mut Session, args: Value) -> Result<Value> {
    let term = required_str(&args, "prompts.search", "term")?;
    let track = optional_bool(&args, "track", true);

    session.set_search_term(term, track);
    let term = session.search_term().to_string();
    render(session, &term)
}

pub fn clear_search(session: &mut Session, _args: Value) -> Result<Value> {
    session.clear_search();
    render(session, "")
}

pub fn summary(session: &mut Session, _args: Value) -> Result<Value> {
    Ok(json!(session.library().summary()))
}

pub fn export(session: &mut Session, _args: Value) -> Result<Value> {
    let exported = session.export_text()?;
    Ok(json!({
        "path": exported.path,
        "fileName": exported.file_name,
        "count": exported.count,
        "message": "Prompts exported successfully!",
    }))
}

/// Import from a `path`, or from inline `content` with an optional `kind`
pub fn import(session: &mut Session, args: Value) -> Result<Value> {
    let outcome = match optional_str(&args, "prompts.import", "path")? {
        Some(path) => session.import_file(Path::new(path))?,
        None => {
            let content = required_str(&args, "prompts.import", "content")?;
            let kind = match optional_str(&args, "prompts.import", "kind")? {
                None | Some("txt") => ImportKind::Txt,
                Some("docx") => ImportKind::Docx,
                Some(other) => return Err(PromptPortError::UnsupportedImport(other.to_string())),
            };
            session.import_content(kind, content.as_bytes())?
        },
    };

    Ok(import_result(&outcome))
}

fn import_result(outcome: &ImportOutcome) -> Value {
    let kind = match outcome {
        ImportOutcome::Imported { kind, .. } => Some(*kind),
        _ => None,
    };
    json!({
        "imported": outcome.imported(),
        "kind": kind,
        "message": outcome.message(),
    })
}

fn render(session: &Session, term: &str) -> Result<Value> {
    Ok(json!({
        "view": session.library().view(term),
        "summary": session.library().summary(),
    }))
}
