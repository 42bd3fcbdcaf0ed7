use thiserror::Error;

use crate::models::validation::ValidationErrors;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// An inbound payload violated one or more schema constraints.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The request itself could not be parsed (malformed JSON, bad query string).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No storage connection was configured at startup.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A query or insert failed after a connection exists.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The canonical "no database" error used by every storage-backed route.
    pub fn not_configured() -> Self {
        AppError::StorageUnavailable("Database not configured".into())
    }

    /// The underlying message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(errors) => errors.to_string(),
            AppError::BadRequest(msg)
            | AppError::StorageUnavailable(msg)
            | AppError::Database(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Shorten a backend message to at most `max` characters.
///
/// Storage faults are reported to clients without internal detail beyond
/// this prefix.
pub fn truncate_detail(message: &str, max: usize) -> String {
    message.chars().take(max).collect()
}
