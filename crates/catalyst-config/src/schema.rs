//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Backend API settings
    #[serde(default)]
    pub api: RawApiConfig,

    /// Session lifecycle settings
    #[serde(default)]
    pub session: RawSessionConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: RawStorageConfig,
}

/// Backend API settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawApiConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: Option<u64>,
}

/// Session lifecycle settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSessionConfig {
    /// Absolute session lifetime in seconds
    pub duration_seconds: Option<u64>,

    /// Maximum idle gap in seconds before forced logout
    pub inactivity_timeout_seconds: Option<u64>,

    /// Minimum gap between handled activity events, in milliseconds
    pub activity_throttle_millis: Option<u64>,
}

/// Local storage settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// Directory holding the credential and audit database
    pub data_dir: Option<PathBuf>,
}
