use serde_json::{json, Value};

use super::required_str;
use crate::{errors::Result, session::Session};

pub fn stats(session: &mut Session, _args: Value) -> Result<Value> {
    Ok(json!(session.analytics_stats()))
}

pub fn export(session: &mut Session, _args: Value) -> Result<Value> {
    let exported = session.export_analytics()?;
    Ok(json!({
        "path": exported.path,
        "fileName": exported.file_name,
        "count": exported.count,
    }))
}

/// Blank feedback is accepted but not recorded
pub fn submit_feedback(session: &mut Session, args: Value) -> Result<Value> {
    let feedback = required_str(&args, "feedback.submit", "feedback")?;
    let recorded = session.submit_feedback(feedback);
    Ok(json!({
        "recorded": recorded,
        "message": if recorded { "Thank you for your feedback!" } else { "" },
    }))
}
