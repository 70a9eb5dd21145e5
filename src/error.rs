//! Domain-specific error types for kpi-rca

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the KPI analytics backend
#[derive(Error, Debug)]
pub enum KpiRcaError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl KpiRcaError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        KpiRcaError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        KpiRcaError::Config {
            message: message.into(),
        }
    }

    /// HTTP status the error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            KpiRcaError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for KpiRcaError {
    fn from(err: anyhow::Error) -> Self {
        KpiRcaError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for KpiRcaError {
    fn from(err: rusqlite::Error) -> Self {
        KpiRcaError::Database {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for KpiRcaError {
    fn from(err: csv::Error) -> Self {
        KpiRcaError::Database {
            message: format!("CSV read failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for KpiRcaError {
    fn from(err: toml::de::Error) -> Self {
        KpiRcaError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

/// Convert KpiRcaError to a JSON error response
impl IntoResponse for KpiRcaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            json!({
                "error": {
                    "code": status.as_u16(),
                    "message": self.to_string()
                }
            })
            .to_string(),
        )
            .into_response()
    }
}

/// Result type alias for kpi-rca operations
pub type Result<T> = std::result::Result<T, KpiRcaError>;
