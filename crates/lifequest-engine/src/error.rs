//! Error types for achievement engine operations

use thiserror::Error;

/// Errors that can occur during achievement evaluation
#[derive(Error, Debug)]
pub enum EngineError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// User or achievement does not exist (for this user)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not allowed on this achievement
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl EngineError {
    pub(crate) fn store(e: impl std::fmt::Display) -> Self {
        EngineError::Store(e.to_string())
    }
}
