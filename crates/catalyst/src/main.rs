//! catalyst - admin console for users, customers and tickets
//!
//! Every invocation wires together:
//! - Configuration loading
//! - The credential store
//! - The session guard
//! - The backend services
//!
//! and then runs either one command or the interactive shell.

mod cli;
mod commands;
mod console;
mod render;
mod shell;

use anyhow::Result;
use catalyst_core::RestoreOutcome;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};
use crate::commands::Input;
use crate::console::Console;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "catalyst starting");

    let console = Console::open(&args)?;

    match console.begin()? {
        RestoreOutcome::Purged(reason) => debug!(reason = %reason, "Stored session had ended"),
        outcome => debug!(outcome = ?outcome, "Session restore"),
    }

    match args.command {
        Command::Shell => {
            // A session that ended while the console was closed is reported first
            console.report_redirect()?;
            shell::run(console).await
        }
        command => {
            let result = commands::run(&console, command, Input::Terminal).await;
            console.report_redirect()?;
            result
        }
    }
}
