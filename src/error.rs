use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum FlowError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] SqlxError),
}

impl FlowError {
    /// Map a sqlx "no rows" failure onto a domain-level 404.
    pub fn not_found_for(entity: &'static str) -> impl FnOnce(SqlxError) -> FlowError {
        move |e| match e {
            SqlxError::RowNotFound => FlowError::NotFound(entity),
            other => FlowError::Database(other),
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            FlowError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{entity} not found"),
                },
            ),
            FlowError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_INPUT".to_string(),
                    message: msg,
                },
            ),
            FlowError::InvalidConfiguration(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_CONFIGURATION".to_string(),
                    message: msg,
                },
            ),
            FlowError::Database(_) | FlowError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
