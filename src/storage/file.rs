use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::models::{NotificationRecord, Report, StoredReport};

use super::ReportStore;

/// Keeps reports in a single pretty-printed JSON array on disk.
///
/// Writes are read-modify-write of the whole file, serialized by an
/// in-process lock. Separate processes sharing the file can still lose
/// updates.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Vec<Value>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ReportStore for FileStore {
    fn name(&self) -> &'static str {
        "backup file"
    }

    async fn insert_report(&self, report: &Report) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.push(serde_json::to_value(report)?);
        let body = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    /// Listing is served from the database only.
    async fn list_active(&self, _limit: u32) -> Result<Vec<StoredReport>, StorageError> {
        Err(StorageError::Unsupported("listing"))
    }

    async fn insert_notification(&self, _record: &NotificationRecord) -> Result<(), StorageError> {
        Err(StorageError::Unsupported("notification log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn report(id: &str, status: &str, age_hours: i64) -> Report {
        Report {
            id: id.to_string(),
            description: format!("report {}", id),
            location: "Riverside".to_string(),
            coordinates: Some("(-73.9654, 40.7829)".to_string()),
            contact_name: None,
            contact_email: Some("someone@example.org".to_string()),
            contact_phone: None,
            urgency_level: "high".to_string(),
            animal_type: Some("cat".to_string()),
            situation_type: None,
            image_url: None,
            ai_analysis: Some(serde_json::json!({"severity": "high"})),
            user_id: None,
            status: status.to_string(),
            created_at: Some(Utc::now() - Duration::hours(age_hours)),
        }
    }

    #[tokio::test]
    async fn test_insert_creates_file_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("reports_backup.json"));

        store.insert_report(&report("a", "active", 0)).await.unwrap();
        store.insert_report(&report("b", "active", 0)).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let entries: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], "a");
        assert_eq!(entries[1]["id"], "b");
        assert_eq!(entries[1]["ai_analysis"]["severity"], "high");
        assert!(entries[1]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_foreign_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports_backup.json");
        std::fs::write(&path, r#"[{"id": "legacy", "note": "hand written"}]"#).unwrap();

        let store = FileStore::new(&path);
        store.insert_report(&report("new", "active", 0)).await.unwrap();

        let entries: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["note"], "hand written");
    }

    #[tokio::test]
    async fn test_insert_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports_backup.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.insert_report(&report("x", "active", 0)).await,
            Err(StorageError::Serde(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("reports_backup.json"));
        store.insert_report(&report("a", "active", 0)).await.unwrap();

        assert!(matches!(store.list_active(10).await, Err(StorageError::Unsupported(_))));
    }
}
