use chrono::{DateTime, Utc};

use crate::db::prompts::Prompt;

/// `[<local time>] <text> (Tags: <tags>)`
pub fn format_line(prompt: &Prompt) -> String {
    format!(
        "[{}] {} (Tags: {})",
        prompt.display_timestamp(),
        prompt.text,
        prompt.tags_display()
    )
}

/// All records oldest first, separated by blank lines
pub fn export_text(prompts: &[Prompt]) -> String {
    prompts
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `prompts_<ISO date to seconds>.txt`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("prompts_{}.txt", now.format("%Y-%m-%dT%H:%M:%S"))
}
