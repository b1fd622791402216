// Domain error types for the hierarchy engine
use serde_json::{json, Value};
use thiserror::Error;

use crate::database::subdivision_store::StoreError;
use crate::path::PathError;

/// Terminal errors of a hierarchy operation. Each variant maps to a distinct
/// status code at the HTTP boundary; none are retried internally.
#[derive(Debug, Error)]
pub enum HierarchyError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict
    #[error("{0}")]
    Conflict(String),

    // 500 Internal Server Error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl HierarchyError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        HierarchyError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HierarchyError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HierarchyError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HierarchyError::Conflict(message.into())
    }

    /// HTTP status code for the excluded routing layer.
    pub fn status_code(&self) -> u16 {
        match self {
            HierarchyError::BadRequest(_) => 400,
            HierarchyError::Forbidden(_) => 403,
            HierarchyError::NotFound(_) => 404,
            HierarchyError::Conflict(_) => 409,
            HierarchyError::Database(_) => 500,
        }
    }

    /// Stable error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            HierarchyError::BadRequest(_) => "BAD_REQUEST",
            HierarchyError::Forbidden(_) => "FORBIDDEN",
            HierarchyError::NotFound(_) => "NOT_FOUND",
            HierarchyError::Conflict(_) => "CONFLICT",
            HierarchyError::Database(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Client-safe JSON body. Database detail is logged, never exposed.
    pub fn to_json(&self) -> Value {
        let message = match self {
            HierarchyError::Database(err) => {
                tracing::error!("Database error: {}", err);
                "An error occurred while processing your request".to_string()
            }
            other => other.to_string(),
        };
        json!({
            "error": true,
            "message": message,
            "code": self.error_code(),
        })
    }
}

// Invalid labels are client input problems.
impl From<PathError> for HierarchyError {
    fn from(err: PathError) -> Self {
        HierarchyError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for HierarchyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => HierarchyError::Conflict(message),
            StoreError::Sqlx(err) => HierarchyError::Database(err),
        }
    }
}
