pub mod app_state;
pub mod cfg;
pub mod coords;
pub mod demo;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod openapi;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use app_state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/save-report", post(handlers::reports::save_report))
        .route("/reports/active", get(handlers::reports::active_reports))
        .merge(openapi::routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
        )
}
