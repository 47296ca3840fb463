use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database not configured")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backup file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backup file is not a JSON array: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0} not supported by this store")]
    Unsupported(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("{0} provider not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected message: status={status} body={body}")]
    Rejected { status: u16, body: String },
}

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}: {cause:#}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal { message, cause: cause.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { success: false, message, error: None }),
            )
                .into_response(),
            ApiError::Internal { message, cause } => {
                tracing::error!("{}: {:#}", message, cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        success: false,
                        message: message.to_string(),
                        error: Some(format!("{:#}", cause)),
                    }),
                )
                    .into_response()
            }
        }
    }
}
