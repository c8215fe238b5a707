//! Config validation CLI tool
//!
//! Validates a Catalyst configuration file and reports any errors.

use catalyst_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a Catalyst configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match catalyst_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", catalyst_config::CURRENT_CONFIG_VERSION);
            println!("  API base URL: {}", settings.api.base_url);
            println!(
                "  Request timeout: {}",
                format_duration(settings.api.request_timeout)
            );
            println!(
                "  Session duration: {}",
                format_duration(settings.session.duration)
            );
            println!(
                "  Inactivity timeout: {}",
                format_duration(settings.session.inactivity_timeout)
            );
            println!(
                "  Activity throttle: {}ms",
                settings.session.activity_throttle.as_millis()
            );
            println!("  Data directory: {}", settings.storage.data_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match e {
                catalyst_config::ConfigError::ValidationFailed { errors } => {
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                }
                other => eprintln!("  {}", other),
            }
            ExitCode::from(1)
        }
    }
}
