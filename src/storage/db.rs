use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{mysql::MySqlRow, pool::PoolOptions, MySql, Pool, Row};

use crate::cfg::DbConfig;
use crate::error::StorageError;
use crate::models::{NotificationRecord, Report, StoredReport, STATUS_ACTIVE};

use super::{keep_readable, ReportStore};

const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY_SECS: u64 = 2;

/// MySQL-backed store holding the `reports` and `notifications` tables.
#[derive(Clone)]
pub struct DatabaseStore {
    pool: Pool<MySql>,
}

impl DatabaseStore {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Connects with a short backoff and creates the tables. When the database
    /// stays unreachable the pool is still returned in lazy mode, so inserts
    /// fail individually and fall back to the backup file.
    pub async fn connect(cfg: &DbConfig) -> Result<Self, StorageError> {
        tracing::info!("connecting to {}", cfg.masked_url());
        let url = cfg.url();

        for attempt in 1..=MAX_RETRIES {
            match pool_options().connect(&url).await {
                Ok(pool) => {
                    tracing::info!("database pool established on attempt {}", attempt);
                    let store = Self::new(pool);
                    store.init_schema().await?;
                    return Ok(store);
                }
                Err(e) => tracing::warn!("database connection attempt {} of {} failed: {}", attempt, MAX_RETRIES, e),
            }
            if attempt < MAX_RETRIES {
                let delay = INITIAL_RETRY_DELAY_SECS * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        tracing::warn!("database unreachable at startup, submissions will use the backup file until it recovers");
        Ok(Self::new(pool_options().connect_lazy(&url)?))
    }

    pub async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id VARCHAR(36) PRIMARY KEY,
                description TEXT NOT NULL,
                location TEXT NOT NULL,
                coordinates VARCHAR(128) NULL,
                contact_name VARCHAR(255) NULL,
                contact_email VARCHAR(320) NULL,
                contact_phone VARCHAR(64) NULL,
                urgency_level VARCHAR(32) NOT NULL DEFAULT 'normal',
                animal_type VARCHAR(128) NULL,
                situation_type VARCHAR(128) NULL,
                image_url TEXT NULL,
                ai_analysis JSON NULL,
                user_id VARCHAR(256) NULL,
                status VARCHAR(32) NOT NULL DEFAULT 'active',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                INDEX idx_status_created (status, created_at)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
                report_id VARCHAR(36) NOT NULL,
                notification_type VARCHAR(32) NOT NULL,
                recipient VARCHAR(320) NOT NULL,
                status VARCHAR(32) NOT NULL,
                message_id VARCHAR(255) NULL,
                sent_at TIMESTAMP NOT NULL,
                INDEX idx_report_id (report_id)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("database schema ready");
        Ok(())
    }
}

fn pool_options() -> PoolOptions<MySql> {
    PoolOptions::<MySql>::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
}

#[async_trait]
impl ReportStore for DatabaseStore {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn insert_report(&self, report: &Report) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id, description, location, coordinates,
                contact_name, contact_email, contact_phone,
                urgency_level, animal_type, situation_type,
                image_url, ai_analysis, user_id, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(?, CURRENT_TIMESTAMP))
            "#,
        )
        .bind(&report.id)
        .bind(&report.description)
        .bind(&report.location)
        .bind(&report.coordinates)
        .bind(&report.contact_name)
        .bind(&report.contact_email)
        .bind(&report.contact_phone)
        .bind(&report.urgency_level)
        .bind(&report.animal_type)
        .bind(&report.situation_type)
        .bind(&report.image_url)
        .bind(report.ai_analysis.as_ref().map(Value::to_string))
        .bind(&report.user_id)
        .bind(&report.status)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_active(&self, limit: u32) -> Result<Vec<StoredReport>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, location, coordinates,
                   contact_name, contact_email, contact_phone,
                   urgency_level, animal_type, situation_type, image_url,
                   CAST(ai_analysis AS CHAR) AS ai_analysis,
                   status, created_at
            FROM reports
            WHERE status = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(STATUS_ACTIVE)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(keep_readable(&rows, decode_row))
    }

    async fn insert_notification(&self, record: &NotificationRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO notifications (report_id, notification_type, recipient, status, message_id, sent_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.report_id)
        .bind(record.channel.as_str())
        .bind(&record.recipient)
        .bind(&record.status)
        .bind(&record.message_id)
        .bind(record.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn decode_row(row: &MySqlRow) -> Result<StoredReport, sqlx::Error> {
    let ai_analysis: Option<String> = row.try_get("ai_analysis")?;
    Ok(StoredReport {
        id: row.try_get("id")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        coordinates: row.try_get("coordinates")?,
        contact_name: row.try_get("contact_name")?,
        contact_email: row.try_get("contact_email")?,
        contact_phone: row.try_get("contact_phone")?,
        urgency_level: row.try_get("urgency_level")?,
        animal_type: row.try_get("animal_type")?,
        situation_type: row.try_get("situation_type")?,
        image_url: row.try_get("image_url")?,
        ai_analysis: ai_analysis.and_then(|raw| serde_json::from_str(&raw).ok()),
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}
