//! Validated settings

use crate::schema::{RawApiConfig, RawConfig, RawSessionConfig, RawStorageConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Backend used when no URL is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Absolute session lifetime
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(60 * 60);

/// Idle gap before forced logout
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Activity events are acted upon at most this often
pub const DEFAULT_ACTIVITY_THROTTLE: Duration = Duration::from_secs(1);

/// Validated settings ready for use by the console
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub storage: StorageSettings,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            api: ApiSettings::from_raw(raw.api),
            session: SessionSettings::from_raw(raw.session),
            storage: StorageSettings::from_raw(raw.storage),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ApiSettings {
    fn from_raw(raw: RawApiConfig) -> Self {
        Self {
            base_url: raw.base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout: raw
                .request_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Session lifecycle timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Absolute lifetime measured from the credential exchange
    pub duration: Duration,
    /// Idle gap measured from the last handled activity event
    pub inactivity_timeout: Duration,
    /// Minimum gap between handled activity events
    pub activity_throttle: Duration,
}

impl SessionSettings {
    fn from_raw(raw: RawSessionConfig) -> Self {
        Self {
            duration: raw
                .duration_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SESSION_DURATION),
            inactivity_timeout: raw
                .inactivity_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_INACTIVITY_TIMEOUT),
            activity_throttle: raw
                .activity_throttle_millis
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_ACTIVITY_THROTTLE),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_SESSION_DURATION,
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            activity_throttle: DEFAULT_ACTIVITY_THROTTLE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

impl StorageSettings {
    fn from_raw(raw: RawStorageConfig) -> Self {
        Self {
            data_dir: raw
                .data_dir
                .unwrap_or_else(catalyst_util::default_data_dir),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: catalyst_util::default_data_dir(),
        }
    }
}
