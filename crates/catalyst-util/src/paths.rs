//! Default paths for the Catalyst console
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/catalyst/config.toml` or `~/.config/catalyst/config.toml`
//! - Data: `$XDG_DATA_HOME/catalyst` or `~/.local/share/catalyst`

use std::path::PathBuf;

/// Application subdirectory name
const APP_DIR: &str = "catalyst";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Database filename within the data directory
pub const DATABASE_FILENAME: &str = "catalyst.db";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/catalyst/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/catalyst/config.toml`
/// 3. `/tmp/catalyst/config.toml` (last resort)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory (credential database and audit log).
///
/// `CATALYST_DATA_DIR` is not consulted here; the command line applies it
/// on top of the configured value.
pub fn default_data_dir() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
