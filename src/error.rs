use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::metrics;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read dataset {path}: {message}")]
    DatasetIo { path: String, message: String },

    #[error("Malformed dataset {path}: {message}")]
    DatasetParse { path: String, message: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for AnalyticsError {
    fn from(err: config::ConfigError) -> Self {
        AnalyticsError::Config(err.to_string())
    }
}

impl From<JsonRejection> for AnalyticsError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) => AnalyticsError::InvalidRequest(rejection.body_text()),
            _ => AnalyticsError::MalformedBody(rejection.body_text()),
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AnalyticsError::MalformedBody(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AnalyticsError::InvalidRequest(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AnalyticsError::Config(_)
            | AnalyticsError::DatasetIo { .. }
            | AnalyticsError::DatasetParse { .. }
            | AnalyticsError::Internal(_) => {
                // Detail stays in the server log, callers get an opaque message.
                error!(error = %self, "request failed");
                metrics::record_internal_error();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal aggregation error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
