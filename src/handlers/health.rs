use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;

/// Which collaborators had usable configuration at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceChecks {
    pub database: bool,
    pub whatsapp: bool,
    pub email: bool,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub time: String,
    pub storage: String,
    pub services: BTreeMap<String, String>,
}

fn label(ok: bool) -> String {
    let s = if ok { "configured" } else { "misconfigured" };
    s.to_string()
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service and collaborator status", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let checks = state.services;
    let services = BTreeMap::from([
        ("database".to_string(), label(checks.database)),
        ("whatsapp".to_string(), label(checks.whatsapp)),
        ("email".to_string(), label(checks.email)),
    ]);
    let all_ok = checks.database && checks.whatsapp && checks.email;

    Json(HealthResponse {
        status: if all_ok { "healthy" } else { "degraded" }.to_string(),
        service: "rescue-radar-api".to_string(),
        time: chrono::Utc::now().to_rfc3339(),
        storage: if state.storage.has_database() { "database" } else { "file" }.to_string(),
        services,
    })
}
