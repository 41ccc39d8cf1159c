//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, plus the
//! mapping from core port errors to HTTP status codes.

use axum::http::StatusCode;

use crate::config::ConfigError;
use biblia_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Maps a port error to the response a handler should return. Backend errors
/// keep their message: the client displays it, per the offline-first design
/// where only remote failures (never configuration gaps) surface to users.
pub fn port_error_response(err: PortError) -> (StatusCode, String) {
    let status = match &err {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::InvalidId(_) => StatusCode::BAD_REQUEST,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Storage(_) | PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        PortError::Backend(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}
