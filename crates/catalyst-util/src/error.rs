//! Error types for the Catalyst console

use thiserror::Error;

/// Errors raised by the session guard
#[derive(Debug, Error)]
pub enum CatalystError {
    /// A login was attempted while this user's session is live
    #[error("Already logged in as {0}; log out first")]
    SessionAlreadyActive(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalystError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CatalystError>;
