use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A report as persisted by either store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub description: String,
    pub location: String,
    /// Positional encoding `"(<lng>, <lat>)"`.
    pub coordinates: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub urgency_level: String,
    pub animal_type: Option<String>,
    pub situation_type: Option<String>,
    pub image_url: Option<String>,
    pub ai_analysis: Option<Value>,
    pub user_id: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub const STATUS_ACTIVE: &str = "active";
pub const DEFAULT_URGENCY: &str = "normal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Whatsapp,
    Email,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Whatsapp => "whatsapp",
            NotificationChannel::Email => "email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub report_id: String,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub status: String,
    pub message_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Row shape read back from a store. Every column is optional so a partially
/// filled row still reaches the listing normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub urgency_level: Option<String>,
    pub animal_type: Option<String>,
    pub situation_type: Option<String>,
    pub image_url: Option<String>,
    pub ai_analysis: Option<Value>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Listing shape returned by `GET /reports/active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ActiveReport {
    pub id: String,
    pub description: String,
    pub location: String,
    pub coordinates: LatLng,
    pub urgency_level: String,
    pub animal_type: Option<String>,
    pub situation_type: Option<String>,
    pub created_at: String,
    pub contact_info: ContactInfo,
    pub image_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub ai_analysis: Option<Value>,
}

/// Incoming body of `POST /save-report`. Only description and location are
/// required; every field keeps its raw JSON value and scalars are turned into
/// text when the report is built.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct SubmitReportRequest {
    #[schema(value_type = Option<String>)]
    pub description: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub location: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub coordinates: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub contact_name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub contact_email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub contact_phone: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub urgency_level: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub animal_type: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub situation_type: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub ai_analysis: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub user_id: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitReportResponse {
    pub success: bool,
    pub report_id: String,
    pub message: String,
    pub notifications_sent: Vec<String>,
    pub saved_to_database: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ActiveReportsResponse {
    pub success: bool,
    pub reports: Vec<ActiveReport>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
