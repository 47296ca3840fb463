pub mod db;
pub mod file;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{NotificationRecord, Report, StoredReport};

pub use db::DatabaseStore;
pub use file::FileStore;

pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Decodes rows one at a time, dropping the ones that fail with a warning.
pub(crate) fn keep_readable<R, E: std::fmt::Display>(
    rows: impl IntoIterator<Item = R>,
    decode: impl Fn(R) -> Result<StoredReport, E>,
) -> Vec<StoredReport> {
    rows.into_iter()
        .filter_map(|row| match decode(row) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("skipping unreadable report row: {}", e);
                None
            }
        })
        .collect()
}

/// A place reports can be written to and read back from.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Short name used in logs and the health payload.
    fn name(&self) -> &'static str;

    async fn insert_report(&self, report: &Report) -> Result<(), StorageError>;

    /// Active reports, newest first.
    async fn list_active(&self, limit: u32) -> Result<Vec<StoredReport>, StorageError>;

    async fn insert_notification(&self, record: &NotificationRecord) -> Result<(), StorageError>;
}

/// Database first, backup file second.
///
/// The database store is only present when it was configured at startup. A
/// report that cannot be written there is appended to the fallback store so
/// exactly one copy is kept per submission.
#[derive(Clone)]
pub struct StorageGateway {
    database: Option<Arc<dyn ReportStore>>,
    fallback: Arc<dyn ReportStore>,
}

impl StorageGateway {
    pub fn new(database: Option<Arc<dyn ReportStore>>, fallback: Arc<dyn ReportStore>) -> Self {
        Self { database, fallback }
    }

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    /// Persists the report and returns whether it reached the database.
    ///
    /// Fails only when the fallback write fails too.
    pub async fn save(&self, report: &Report) -> Result<bool, StorageError> {
        match &self.database {
            Some(db) => match db.insert_report(report).await {
                Ok(()) => {
                    tracing::info!("report {} saved to {}", report.id, db.name());
                    return Ok(true);
                }
                Err(e) => tracing::warn!("database insert failed for report {}: {}", report.id, e),
            },
            None => tracing::info!("database not configured, using {} storage", self.fallback.name()),
        }

        let mut backup = report.clone();
        backup.created_at.get_or_insert_with(chrono::Utc::now);
        self.fallback.insert_report(&backup).await?;
        tracing::info!("report {} saved to {}", report.id, self.fallback.name());
        Ok(false)
    }

    pub async fn list_active(&self, limit: u32) -> Result<Vec<StoredReport>, StorageError> {
        let db = self.database.as_ref().ok_or(StorageError::Unavailable)?;
        db.list_active(limit).await
    }

    /// Best-effort; errors are logged and dropped.
    pub async fn log_notification(&self, record: &NotificationRecord) {
        let Some(db) = &self.database else {
            return;
        };
        if let Err(e) = db.insert_notification(record).await {
            tracing::debug!(
                "could not log {} notification for report {}: {}",
                record.channel.as_str(),
                record.report_id,
                e
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;

    /// In-memory store whose failure mode can be switched per test.
    #[derive(Default)]
    pub struct MemoryStore {
        pub reports: Mutex<Vec<Report>>,
        pub notifications: Mutex<Vec<NotificationRecord>>,
        /// Raw rows, decoded on every listing like database rows are.
        pub rows: Mutex<Vec<Value>>,
        pub fail_inserts: bool,
        pub fail_reads: bool,
        pub fail_notifications: bool,
    }

    impl MemoryStore {
        pub fn failing() -> Self {
            Self { fail_inserts: true, fail_reads: true, fail_notifications: true, ..Default::default() }
        }

        pub fn with_rows(rows: Vec<StoredReport>) -> Self {
            Self::with_raw_rows(rows.iter().map(|r| serde_json::to_value(r).unwrap()).collect())
        }

        pub fn with_raw_rows(rows: Vec<Value>) -> Self {
            Self { rows: Mutex::new(rows), ..Default::default() }
        }

        pub fn report_count(&self) -> usize {
            self.reports.lock().unwrap().len()
        }

        pub fn notification_count(&self) -> usize {
            self.notifications.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReportStore for MemoryStore {
        fn name(&self) -> &'static str {
            "memory"
        }

        async fn insert_report(&self, report: &Report) -> Result<(), StorageError> {
            if self.fail_inserts {
                return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
            }
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }

        async fn list_active(&self, limit: u32) -> Result<Vec<StoredReport>, StorageError> {
            if self.fail_reads {
                return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
            }
            let rows: Vec<Value> = self.rows.lock().unwrap().iter().take(limit as usize).cloned().collect();
            Ok(keep_readable(rows, serde_json::from_value::<StoredReport>))
        }

        async fn insert_notification(&self, record: &NotificationRecord) -> Result<(), StorageError> {
            if self.fail_notifications {
                return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
            }
            self.notifications.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}
