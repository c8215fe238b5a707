//! Configuration validation

use crate::schema::RawConfig;
use crate::settings::{
    DEFAULT_ACTIVITY_THROTTLE, DEFAULT_INACTIVITY_TIMEOUT, DEFAULT_SESSION_DURATION,
};
use std::time::Duration;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid API base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("'{field}' must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("Inactivity timeout {inactivity}s exceeds session duration {duration}s")]
    InactivityExceedsDuration { inactivity: u64, duration: u64 },

    #[error("Activity throttle {throttle_ms}ms must be shorter than the inactivity timeout")]
    ThrottleTooLong { throttle_ms: u64 },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(url) = &config.api.base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ValidationError::InvalidBaseUrl(url.clone()));
    }

    if config.api.request_timeout_seconds == Some(0) {
        errors.push(ValidationError::ZeroDuration {
            field: "api.request_timeout_seconds",
        });
    }

    let session = &config.session;
    if session.duration_seconds == Some(0) {
        errors.push(ValidationError::ZeroDuration {
            field: "session.duration_seconds",
        });
    }
    if session.inactivity_timeout_seconds == Some(0) {
        errors.push(ValidationError::ZeroDuration {
            field: "session.inactivity_timeout_seconds",
        });
    }
    if session.activity_throttle_millis == Some(0) {
        errors.push(ValidationError::ZeroDuration {
            field: "session.activity_throttle_millis",
        });
    }

    let duration = session
        .duration_seconds
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SESSION_DURATION);
    let inactivity = session
        .inactivity_timeout_seconds
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_INACTIVITY_TIMEOUT);
    let throttle = session
        .activity_throttle_millis
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_ACTIVITY_THROTTLE);

    if !duration.is_zero() && inactivity > duration {
        errors.push(ValidationError::InactivityExceedsDuration {
            inactivity: inactivity.as_secs(),
            duration: duration.as_secs(),
        });
    }

    if !inactivity.is_zero() && throttle >= inactivity {
        errors.push(ValidationError::ThrottleTooLong {
            throttle_ms: throttle.as_millis() as u64,
        });
    }

    errors
}
