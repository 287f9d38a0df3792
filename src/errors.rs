use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors crossing the persistence-adapter boundary.
///
/// The adapter never offers multi-key transactions, so a multi-step effect
/// can fail partway through; callers decide per step what to compensate.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("write rejected for {collection}/{key}: {reason}")]
    WriteRejected {
        collection: String,
        key: String,
        reason: String,
    },

    #[error("read failed for {collection}: {reason}")]
    ReadFailed { collection: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Central error type for the fulfillment core.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status transition: {0}")]
    InvalidStatus(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Pass/fail signal shown to the user. No failure here is fatal; retries
    /// are always manual.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Persistence(_) => {
                "The change could not be saved. Please try again.".to_string()
            }
            ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::ValidationError(msg) => msg.clone(),
            ServiceError::InvalidOperation(msg) => msg.clone(),
            ServiceError::InvalidStatus(msg) => msg.clone(),
            ServiceError::ExternalServiceError(_) | ServiceError::InternalError(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Serializable pass/fail envelope handed back to UI callers.
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub ok: bool,
    pub message: String,
}

impl OperationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for OperationOutcome {
    fn from(error: &ServiceError) -> Self {
        Self {
            ok: false,
            message: error.user_message(),
        }
    }
}
