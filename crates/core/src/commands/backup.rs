use serde_json::{json, Value};

use super::{optional_bool, required_str};
use crate::{errors::Result, session::Session};

/// Shown when the drive holds no backups
pub const NO_BACKUPS: &str = "No PromptPort backups found";

pub fn create(session: &mut Session, _args: Value) -> Result<Value> {
    let file = session.backup()?;
    Ok(json!({
        "file": file,
        "count": session.library().len(),
        "message": "Backup completed successfully!",
    }))
}

pub fn list(session: &mut Session, _args: Value) -> Result<Value> {
    let files = session.list_backups()?;
    if files.is_empty() {
        return Ok(json!({ "files": files, "message": NO_BACKUPS }));
    }
    Ok(json!({ "files": files }))
}

/// Restore from the backup `id`
///
/// Without `confirm: true` nothing changes and the response describes what
/// the restore would replace.
pub fn restore(session: &mut Session, args: Value) -> Result<Value> {
    let id = required_str(&args, "backup.restore", "id")?;

    if !optional_bool(&args, "confirm", false) {
        let preview = session.restore_preview(id)?;
        return Ok(json!({
            "restored": false,
            "preview": preview,
            "message": format!(
                "This will replace your current {} prompts with {} prompts from the backup.",
                preview.current, preview.incoming
            ),
        }));
    }

    let count = session.restore(id)?;
    Ok(json!({
        "restored": true,
        "count": count,
        "message": format!("Successfully restored {} prompts!", count),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::commands::{prompts, test_support::session};

    #[test]
    fn test_backup_list_restore_flow() {
        let (mut session, _dir) = session();
        prompts::create(&mut session, json!({"text": "first"})).unwrap();

        let created = create(&mut session, json!({})).unwrap();
        let id = created["file"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["count"], json!(1));

        prompts::create(&mut session, json!({"text": "second"})).unwrap();

        let listed = list(&mut session, json!({})).unwrap();
        assert_eq!(listed["files"][0]["id"], json!(id));
        assert!(listed.get("message").is_none());

        let preview = restore(&mut session, json!({"id": id})).unwrap();
        assert_eq!(preview["restored"], json!(false));
        assert_eq!(preview["preview"]["current"], json!(2));
        assert_eq!(preview["preview"]["incoming"], json!(1));
        assert_eq!(session.library().len(), 2);

        let done = restore(&mut session, json!({"id": id, "confirm": true})).unwrap();
        assert_eq!(done["restored"], json!(true));
        assert_eq!(done["message"], json!("Successfully restored 1 prompts!"));
        assert_eq!(session.library().len(), 1);
    }

    #[test]
    fn test_restore_requires_id() {
        let (mut session, _dir) = session();
        assert_eq!(
            restore(&mut session, json!({"confirm": true}))
                .unwrap_err()
                .to_jsonrpc_code(),
            -32602
        );
    }

    #[test]
    fn test_list_with_no_drive_folder() {
        let (mut session, _dir) = session();
        let listed = list(&mut session, json!({})).unwrap();
        assert_eq!(listed["files"], json!([]));
        assert_eq!(listed["message"], json!("No PromptPort backups found"));
    }
}
