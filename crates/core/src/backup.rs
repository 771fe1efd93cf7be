//! Cloud backup and restore
//!
//! A backup is a pretty-printed JSON document
//! `{ "prompts": [...], "exportDate": "...", "version": "1.0" }` stored on a
//! [`CloudDrive`]. Authentication against a hosted drive happens outside this
//! crate; [`FolderDrive`] maps the drive onto a local (typically synced)
//! folder.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db::prompts::{now_iso, Prompt},
    errors::{PromptPortError, Result},
};

pub const BACKUP_VERSION: &str = "1.0";
/// Every backup file name contains this
pub const BACKUP_NAME_PREFIX: &str = "promptport_backup";
/// Most backups offered for restore
pub const LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub prompts:     Vec<Prompt>,
    pub export_date: String,
    pub version:     String,
}

/// A file as listed by the drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id:           String,
    pub name:         String,
    pub created_time: DateTime<Utc>,
}

/// Remote file storage used for backups
#[allow(async_fn_in_trait)]
pub trait CloudDrive {
    /// Service name recorded in analytics
    fn name(&self) -> &str;

    async fn upload(&self, name: &str, body: Vec<u8>) -> Result<DriveFile>;

    /// JSON files whose name contains `name_contains`, newest first
    async fn list(&self, name_contains: &str, limit: usize) -> Result<Vec<DriveFile>>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Drive backed by a local directory; file ids are file names
#[derive(Debug, Clone)]
pub struct FolderDrive {
    root: PathBuf,
}

impl FolderDrive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, file_id: &str) -> Result<PathBuf> {
        let valid = !file_id.is_empty()
            && !file_id.contains(['/', '\\'])
            && file_id != "."
            && file_id != "..";
        if !valid {
            return Err(PromptPortError::Drive(format!("invalid file id '{}'", file_id)));
        }
        Ok(self.root.join(file_id))
    }
}

impl CloudDrive for FolderDrive {
    fn name(&self) -> &str {
        "folder"
    }

    async fn upload(&self, name: &str, body: Vec<u8>) -> Result<DriveFile> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| drive_io("create drive folder", e))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| drive_io("upload", e))?;

        Ok(DriveFile {
            id:           name.to_string(),
            name:         name.to_string(),
            created_time: Utc::now(),
        })
    }

    async fn list(&self, name_contains: &str, limit: usize) -> Result<Vec<DriveFile>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(drive_io("list", e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| drive_io("list", e))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.contains(name_contains) || !name.ends_with(".json") {
                continue;
            }

            let metadata = entry.metadata().await.map_err(|e| drive_io("stat", e))?;
            if !metadata.is_file() {
                continue;
            }
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map_err(|e| drive_io("stat", e))?;

            files.push(DriveFile {
                id:           name.clone(),
                name,
                created_time: DateTime::<Utc>::from(created),
            });
        }

        files.sort_by(|a, b| b.created_time.cmp(&a.created_time).then_with(|| b.name.cmp(&a.name)));
        files.truncate(limit);
        Ok(files)
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let path = self.path_for(file_id)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| drive_io("download", e))
    }
}

fn drive_io(action: &str, err: std::io::Error) -> PromptPortError {
    PromptPortError::Drive(format!("{} failed: {}", action, err))
}

/// `promptport_backup_<YYYY-MM-DD>.json`
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("{}_{}.json", BACKUP_NAME_PREFIX, now.format("%Y-%m-%d"))
}

pub fn encode_backup(prompts: &[Prompt]) -> Result<Vec<u8>> {
    let backup = BackupFile {
        prompts:     prompts.to_vec(),
        export_date: now_iso(),
        version:     BACKUP_VERSION.to_string(),
    };
    Ok(serde_json::to_vec_pretty(&backup)?)
}

/// Pull the `prompts` array out of a downloaded backup
///
/// Entry shapes are checked by `PromptLibrary::restore`.
pub fn decode_backup(bytes: &[u8]) -> Result<Value> {
    let mut document: Value = serde_json::from_slice(bytes)
        .map_err(|e| PromptPortError::InvalidBackup(format!("not JSON: {}", e)))?;

    match document.get_mut("prompts").map(Value::take) {
        Some(prompts @ Value::Array(_)) => Ok(prompts),
        _ => Err(PromptPortError::InvalidBackup(
            "missing prompts array".into(),
        )),
    }
}

/// Upload the collection as today's backup file
pub async fn create_backup<D: CloudDrive>(drive: &D, prompts: &[Prompt]) -> Result<DriveFile> {
    let name = backup_file_name(Utc::now());
    let body = encode_backup(prompts)?;
    let file = drive.upload(&name, body).await?;
    log::info!("Uploaded backup {} with {} prompts", file.name, prompts.len());
    Ok(file)
}

/// Backups available for restore, newest first
pub async fn list_backups<D: CloudDrive>(drive: &D) -> Result<Vec<DriveFile>> {
    drive.list(BACKUP_NAME_PREFIX, LIST_LIMIT).await
}

/// Download a backup and return its prompts array
pub async fn fetch_backup<D: CloudDrive>(drive: &D, file_id: &str) -> Result<Value> {
    let bytes = drive.download(file_id).await?;
    decode_backup(&bytes)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_backup_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        assert_eq!(backup_file_name(now), "promptport_backup_2024-02-29.json");
    }

    #[test]
    fn test_encode_backup_shape() {
        let prompts = vec![Prompt::new("hello", vec!["a".into()])];
        let value: Value = serde_json::from_slice(&encode_backup(&prompts).unwrap()).unwrap();
        assert_eq!(value["version"], json!("1.0"));
        assert!(value["exportDate"].is_string());
        assert_eq!(value["prompts"][0]["text"], json!("hello"));
    }

    #[test]
    fn test_decode_backup_rejects_bad_shapes() {
        assert!(matches!(
            decode_backup(b"not json"),
            Err(PromptPortError::InvalidBackup(_))
        ));
        assert!(matches!(
            decode_backup(br#"{"prompts": {"a": 1}}"#),
            Err(PromptPortError::InvalidBackup(_))
        ));
        assert!(matches!(
            decode_backup(br#"[1, 2]"#),
            Err(PromptPortError::InvalidBackup(_))
        ));
    }

    #[test]
    fn test_decode_backup_returns_prompts() {
        let prompts = decode_backup(br#"{"prompts": [{"text": "x"}], "version": "1.0"}"#).unwrap();
        assert_eq!(prompts, json!([{"text": "x"}]));
    }

    #[tokio::test]
    async fn test_folder_drive_upload_list_download() {
        let dir = tempdir().unwrap();
        let drive = FolderDrive::new(dir.path().join("drive"));
        let prompts = vec![Prompt::new("saved", vec![])];

        let file = create_backup(&drive, &prompts).await.unwrap();
        assert!(file.name.starts_with(BACKUP_NAME_PREFIX));

        let listed = list_backups(&drive).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, file.id);

        let restored = fetch_backup(&drive, &file.id).await.unwrap();
        assert_eq!(restored[0]["text"], json!("saved"));
    }

    #[tokio::test]
    async fn test_folder_drive_list_filters_and_limits() {
        let dir = tempdir().unwrap();
        let drive = FolderDrive::new(dir.path());
        for i in 0..12 {
            drive
                .upload(&format!("promptport_backup_2024-01-{:02}.json", i + 1), b"{}".to_vec())
                .await
                .unwrap();
        }
        drive.upload("notes.json", b"{}".to_vec()).await.unwrap();
        drive
            .upload("promptport_backup_old.txt", b"{}".to_vec())
            .await
            .unwrap();

        let listed = list_backups(&drive).await.unwrap();
        assert_eq!(listed.len(), LIST_LIMIT);
        assert!(listed.iter().all(|f| f.name.starts_with(BACKUP_NAME_PREFIX)));
        assert!(listed.iter().all(|f| f.name.ends_with(".json")));
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_time >= pair[1].created_time));
    }

    #[tokio::test]
    async fn test_folder_drive_missing_folder_lists_nothing() {
        let dir = tempdir().unwrap();
        let drive = FolderDrive::new(dir.path().join("absent"));
        assert!(list_backups(&drive).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_folder_drive_rejects_path_ids() {
        let dir = tempdir().unwrap();
        let drive = FolderDrive::new(dir.path());
        assert!(matches!(
            drive.download("../secret.json").await,
            Err(PromptPortError::Drive(_))
        ));
        assert!(matches!(
            drive.download("missing.json").await,
            Err(PromptPortError::Drive(_))
        ));
    }
}
