//! Interactive console
//!
//! A single-threaded loop over three sources: lines from stdin, the
//! earliest session timer, and Ctrl-C. Every line counts as a key press.
//! When the session ends, for any reason, the shell reports the redirect
//! and goes back to the login prompt.

use anyhow::{Context, Result};
use catalyst_api::ActivityKind;
use catalyst_util::saturating_until;
use clap::Parser;
use std::io::{BufRead, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::cli::{Command, ShellLine};
use crate::commands::{self, Input};
use crate::console::Console;

/// What the next line of input means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Username,
    Password { username: String },
    Command,
}

impl Prompt {
    fn initial(logged_in: bool) -> Self {
        if logged_in {
            Prompt::Command
        } else {
            Prompt::Username
        }
    }

    fn text(&self) -> &'static str {
        match self {
            Prompt::Username => "username: ",
            Prompt::Password { .. } => "password: ",
            Prompt::Command => "catalyst> ",
        }
    }
}

/// What the loop does after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Lines typed at the console, as delivered by the reader thread
type Lines = mpsc::UnboundedReceiver<std::io::Result<String>>;

pub async fn run(console: Console) -> Result<()> {
    let mut lines = spawn_stdin_reader();
    drive(&console, &mut lines).await?;
    Ok(())
}

/// Run the loop until `exit`, end of input or Ctrl-C. Returns the prompt
/// that was showing when the loop ended.
async fn drive(console: &Console, lines: &mut Lines) -> Result<Prompt> {
    let mut prompt = Prompt::initial(console.is_logged_in());

    if prompt == Prompt::Username {
        println!("Log in to continue. Type 'exit' to quit.");
    }
    show_prompt(&prompt)?;

    loop {
        let wait = console
            .next_deadline()?
            .map(|deadline| saturating_until(deadline, catalyst_util::now()));

        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("End of input, leaving shell");
                    break;
                };
                let line = line.context("Failed to read from stdin")?;
                console.record_activity(ActivityKind::KeyPress)?;
                if handle_line(console, &mut prompt, line.trim()).await? == Flow::Exit {
                    break;
                }
            }

            // Earliest session timer
            _ = tokio::time::sleep_until(deadline_instant(wait)), if wait.is_some() => {
                console.tick()?;
            }

            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                println!();
                info!("Received Ctrl-C, leaving shell");
                break;
            }
        }

        if console.report_redirect()? {
            prompt = Prompt::Username;
        }
        show_prompt(&prompt)?;
    }

    Ok(prompt)
}

/// Stdin is read on its own thread so a pending read never holds up exit
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn deadline_instant(wait: Option<Duration>) -> Instant {
    Instant::now() + wait.unwrap_or_default()
}

fn show_prompt(prompt: &Prompt) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", prompt.text())?;
    stdout.flush().context("Failed to flush stdout")
}

async fn handle_line(console: &Console, prompt: &mut Prompt, line: &str) -> Result<Flow> {
    if matches!(line, "exit" | "quit") {
        return Ok(Flow::Exit);
    }

    match std::mem::replace(prompt, Prompt::Username) {
        Prompt::Username => {
            if !line.is_empty() {
                *prompt = Prompt::Password {
                    username: line.to_string(),
                };
            }
        }
        Prompt::Password { username } => match console.auth.login(&username, line).await {
            Ok(user) => {
                println!("Welcome, {}", user.username);
                *prompt = Prompt::Command;
            }
            Err(e) => {
                eprintln!("{}", e);
                *prompt = Prompt::Username;
            }
        },
        Prompt::Command => {
            *prompt = Prompt::Command;
            if line.is_empty() {
                return Ok(Flow::Continue);
            }
            run_command(console, line).await;
            if !console.is_logged_in() {
                *prompt = Prompt::Username;
            }
        }
    }

    Ok(Flow::Continue)
}

async fn run_command(console: &Console, line: &str) {
    let words = match split_words(line) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let parsed = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed,
        Err(e) => {
            // Also covers `help` and `--help`
            eprintln!("{}", e);
            return;
        }
    };

    if matches!(parsed.command, Command::Shell) {
        eprintln!("Already in the shell");
        return;
    }

    if let Err(e) = commands::run(console, parsed.command, Input::Inline).await {
        warn!(error = %e, "Command failed");
        eprintln!("{:#}", e);
    }
}

/// Split a line into words. Double or single quotes group words, and a
/// backslash escapes the next character.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
