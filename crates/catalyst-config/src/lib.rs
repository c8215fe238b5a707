//! Configuration parsing and validation for the Catalyst console
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Backend API location and request timeout
//! - Session lifetime, inactivity timeout and activity throttling
//! - Storage location for persisted credentials
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration if the file exists, otherwise fall back to defaults
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        Ok(Settings::default())
    }
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [api]
            base_url = "https://console.example.com/api"
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(settings.api.base_url, "https://console.example.com/api");
        assert_eq!(settings.session.duration, Duration::from_secs(60 * 60));
        assert_eq!(settings.session.inactivity_timeout, Duration::from_secs(15 * 60));
        assert_eq!(settings.session.activity_throttle, Duration::from_secs(1));
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [api]
            base_url = "http://localhost:9000/api"
            request_timeout_seconds = 5

            [session]
            duration_seconds = 1800
            inactivity_timeout_seconds = 300
            activity_throttle_millis = 250

            [storage]
            data_dir = "/var/lib/catalyst"
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(settings.api.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.session.duration, Duration::from_secs(1800));
        assert_eq!(settings.session.inactivity_timeout, Duration::from_secs(300));
        assert_eq!(settings.session.activity_throttle, Duration::from_millis(250));
        assert_eq!(
            settings.storage.data_dir,
            std::path::PathBuf::from("/var/lib/catalyst")
        );
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_values() {
        let config = r#"
            config_version = 1

            [api]
            base_url = "ftp://nope"

            [session]
            duration_seconds = 600
            inactivity_timeout_seconds = 900
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "config_version = 1").unwrap();
        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.api.base_url, DEFAULT_API_URL);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let settings = load_config_or_default(&missing).unwrap();
        assert_eq!(settings.session.duration, DEFAULT_SESSION_DURATION);
    }
}
