//! Error handling module
//!
//! This module provides centralized error handling for the application.

use thiserror::Error;

use crate::domain::authorisation::OrderRequestType;

/// Application error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A wire request was built without a field the gateway contract requires.
    /// This is a programming error and is never retried.
    #[error("Missing mandatory field `{field}` for {operation} request")]
    MissingMandatoryField {
        operation: OrderRequestType,
        field: &'static str,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway answered with something the caller has no mapping for.
    #[error("Unexpected response from {gateway}: {detail}")]
    UnexpectedResponse { gateway: String, detail: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unsupported gateway: {0}")]
    UnsupportedGateway(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> warp::http::StatusCode {
        match self {
            AppError::Validation(_) => warp::http::StatusCode::BAD_REQUEST,
            AppError::MissingMandatoryField { .. } => warp::http::StatusCode::BAD_REQUEST,
            AppError::UnsupportedGateway(_) => warp::http::StatusCode::BAD_REQUEST,
            AppError::Transport(_) => warp::http::StatusCode::BAD_GATEWAY,
            AppError::UnexpectedResponse { .. } => warp::http::StatusCode::BAD_GATEWAY,
            _ => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is a caller contract violation rather than a runtime failure
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, AppError::MissingMandatoryField { .. })
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

impl warp::reject::Reject for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<quick_xml::se::SeError> for AppError {
    fn from(err: quick_xml::se::SeError) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
