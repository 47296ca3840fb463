use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::app_state::AppState;
use crate::coords;
use crate::error::{ApiError, StorageError};
use crate::models::{
    ActiveReport, ActiveReportsResponse, ContactInfo, ErrorResponse, Report, StoredReport, SubmitReportRequest,
    SubmitReportResponse, DEFAULT_URGENCY, STATUS_ACTIVE,
};
use crate::storage::DEFAULT_LIST_LIMIT;

pub const MISSING_FIELDS: &str = "Description and location are required";

/// POST /save-report
#[utoipa::path(
    post,
    path = "/save-report",
    request_body = SubmitReportRequest,
    responses(
        (status = 200, description = "Report stored and notifications attempted", body = SubmitReportResponse),
        (status = 400, description = "Missing description or location", body = ErrorResponse),
        (status = 500, description = "Report could not be stored", body = ErrorResponse)
    )
)]
pub async fn save_report(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitReportResponse>, ApiError> {
    let request = match payload {
        Ok(Json(body @ Value::Object(_))) => serde_json::from_value::<SubmitReportRequest>(body)
            .map_err(|e| {
                tracing::debug!("unreadable report body: {}", e);
                ApiError::BadRequest(MISSING_FIELDS.to_string())
            })?,
        Ok(Json(_)) => {
            tracing::debug!("rejected report body: not a JSON object");
            return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
        }
        Err(rejection) => {
            tracing::debug!("rejected report body: {}", rejection);
            return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
        }
    };
    let report = build_report(request, uuid::Uuid::new_v4().to_string())?;

    let persisted = state
        .storage
        .save(&report)
        .await
        .map_err(|e| ApiError::internal("Failed to save report", e))?;

    let outcome = state.dispatcher.dispatch(&report, &state.storage, persisted).await;

    Ok(Json(SubmitReportResponse {
        success: true,
        report_id: report.id,
        message: "Report saved successfully".to_string(),
        notifications_sent: outcome.sent_names(),
        saved_to_database: persisted,
    }))
}

/// Validates presence of the required fields and normalizes the rest.
pub fn build_report(request: SubmitReportRequest, id: String) -> Result<Report, ApiError> {
    let (Some(description), Some(location)) = (text(request.description), text(request.location)) else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    Ok(Report {
        id,
        description,
        location,
        coordinates: request
            .coordinates
            .as_ref()
            .and_then(coords::from_request)
            .map(coords::encode_point),
        contact_name: non_empty(request.contact_name),
        contact_email: non_empty(request.contact_email),
        contact_phone: non_empty(request.contact_phone),
        urgency_level: non_empty(request.urgency_level).unwrap_or_else(|| DEFAULT_URGENCY.to_string()),
        animal_type: non_empty(request.animal_type),
        situation_type: non_empty(request.situation_type),
        image_url: non_empty(request.image_url),
        ai_analysis: request.ai_analysis.filter(is_truthy),
        user_id: non_empty(request.user_id),
        status: STATUS_ACTIVE.to_string(),
        created_at: None,
    })
}

/// Text form of a submitted value. Strings pass through, other values use
/// their JSON rendering, null is absent.
fn text(v: Option<Value>) -> Option<String> {
    match v? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn non_empty(v: Option<Value>) -> Option<String> {
    text(v).filter(|s| !s.is_empty())
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// GET /reports/active
#[utoipa::path(
    get,
    path = "/reports/active",
    responses((status = 200, description = "Active reports, or demo data when no database is available", body = ActiveReportsResponse))
)]
pub async fn active_reports(State(state): State<AppState>) -> Json<ActiveReportsResponse> {
    match state.storage.list_active(DEFAULT_LIST_LIMIT).await {
        Ok(rows) if !rows.is_empty() => {
            let now = Utc::now();
            let reports: Vec<ActiveReport> = rows.into_iter().map(|row| normalize(row, now)).collect();
            return Json(ActiveReportsResponse {
                success: true,
                total: reports.len(),
                reports,
                source: None,
                message: None,
            });
        }
        Ok(_) => tracing::info!("no active reports in database, using demo data"),
        Err(StorageError::Unavailable) => tracing::info!("database not available, using demo data"),
        Err(e) => tracing::warn!("database error while listing reports: {}", e),
    }

    let cached = state.demo_cache.get_or_refresh(Utc::now());
    Json(cached.as_ref().clone())
}

/// Fills every missing field with a displayable default.
pub fn normalize(row: StoredReport, now: DateTime<Utc>) -> ActiveReport {
    let coordinates = match row.coordinates.as_deref().map(coords::decode_point) {
        Some(Some(point)) => point,
        Some(None) => {
            tracing::warn!("report {:?} has unreadable coordinates, using fallback point", row.id);
            coords::FALLBACK_POINT
        }
        None => coords::FALLBACK_POINT,
    };

    ActiveReport {
        id: row.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        description: row.description.unwrap_or_else(|| "No description provided".to_string()),
        location: row.location.unwrap_or_else(|| "Location not specified".to_string()),
        coordinates,
        urgency_level: row.urgency_level.unwrap_or_else(|| DEFAULT_URGENCY.to_string()),
        animal_type: row.animal_type,
        situation_type: row.situation_type,
        created_at: row.created_at.unwrap_or(now).to_rfc3339(),
        contact_info: ContactInfo {
            name: row.contact_name,
            email: row.contact_email,
            phone: row.contact_phone,
        },
        image_url: row.image_url,
        ai_analysis: row.ai_analysis,
    }
}
