//! Error types for Curio core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; host frontends map them
//! to user-facing messages (a full device is actionable by the user,
//! a generic storage failure is not).

use thiserror::Error;

/// Result type alias for Curio operations.
pub type Result<T> = std::result::Result<T, CurioError>;

/// Core error type for Curio operations.
#[derive(Debug, Error)]
pub enum CurioError {
    /// Storage quota denied the write. Never retried; the user must
    /// free up space before the operation can succeed.
    #[error("Storage full: {0}")]
    StorageFull(String),

    /// Storage backend error (I/O, serialization) after retries.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CurioError {
    /// Whether this error indicates an exhausted storage quota.
    pub fn is_storage_full(&self) -> bool {
        matches!(self, CurioError::StorageFull(_))
    }
}

impl From<std::io::Error> for CurioError {
    fn from(err: std::io::Error) -> Self {
        CurioError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CurioError {
    fn from(err: serde_json::Error) -> Self {
        CurioError::Storage(err.to_string())
    }
}
