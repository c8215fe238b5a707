//! Command-line arguments

use catalyst_util::default_config_path;
use catalyst_views::{Route, StatusFilter};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// catalyst - admin console for users, customers and tickets
#[derive(Parser, Debug)]
#[command(name = "catalyst")]
#[command(about = "Admin console for users, customers and tickets", long_about = None)]
#[command(version)]
pub struct Args {
    /// Configuration file path (default: ~/.config/catalyst/config.toml)
    #[arg(short, long, global = true, env = "CATALYST_CONFIG", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Backend URL override (or set CATALYST_API_URL env var)
    #[arg(long, global = true, env = "CATALYST_API_URL")]
    pub api_url: Option<String>,

    /// Data directory override (or set CATALYST_DATA_DIR env var)
    #[arg(short, long, global = true, env = "CATALYST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// A command typed at the interactive prompt
#[derive(Parser, Debug)]
#[command(name = "catalyst", no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        username: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "CATALYST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show who is signed in and when the session ends
    Status {
        /// Number of audit entries to show
        #[arg(long, default_value_t = 5)]
        audit: usize,
    },

    /// Email a password reset link
    ForgotPassword { email: String },

    /// Set a new password using a reset token
    ResetPassword {
        token: String,

        #[arg(long)]
        new_password: Option<String>,

        #[arg(long)]
        confirm_password: Option<String>,
    },

    #[command(subcommand)]
    Users(UsersCommand),

    #[command(subcommand)]
    Customers(CustomersCommand),

    #[command(subcommand)]
    Tickets(TicketsCommand),

    /// Interactive console; the session is enforced while it runs
    Shell,
}

impl Command {
    /// Screen the command stands in for, if it needs routing at all
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } | Command::ForgotPassword { .. } => Some(Route::Login),
            Command::ResetPassword { token, .. } => Some(Route::ResetPassword {
                token: Some(token.clone()),
            }),
            Command::Users(UsersCommand::List { .. }) => Some(Route::Users),
            Command::Users(UsersCommand::Show { username })
            | Command::Users(UsersCommand::Update { username, .. }) => Some(Route::UserDetail {
                username: username.clone(),
            }),
            Command::Customers(CustomersCommand::List { .. }) => Some(Route::Customers),
            Command::Customers(CustomersCommand::Show { id })
            | Command::Customers(CustomersCommand::Update { id, .. }) => {
                Some(Route::CustomerDetail { id: id.to_string() })
            }
            Command::Tickets(TicketsCommand::Create { .. }) => Some(Route::TicketCreate),
            Command::Tickets(_) => Some(Route::Tickets),
            Command::Logout | Command::Status { .. } | Command::Shell => None,
        }
    }
}

/// Column selection, ordering, paging and export for list commands
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TableArgs {
    /// Comma-separated column keys to show, in place of the defaults
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Show every column
    #[arg(long, conflicts_with = "columns")]
    pub all_columns: bool,

    /// Column key to sort by; prefix with '-' for descending
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1, requires = "page_size")]
    pub page: usize,

    /// Write the visible columns to a spreadsheet-ready file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(long, default_value = "")]
        username: String,

        #[arg(long, default_value = "")]
        full_name: String,

        #[arg(long, default_value = "")]
        email: String,

        /// Exact role
        #[arg(long, default_value = "")]
        role: String,

        /// all, active or inactive
        #[arg(long)]
        status: Option<StatusFilter>,

        /// Ask the backend for active users only
        #[arg(long)]
        active_only: bool,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Show one user
    Show { username: String },

    /// Change a user's details
    Update {
        username: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        active: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomersCommand {
    /// List customers
    List {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        identifier_no: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Exact customer type
        #[arg(long = "type", default_value = "")]
        customer_type: String,

        /// all, active or inactive
        #[arg(long)]
        status: Option<StatusFilter>,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Show one customer
    Show { id: i64 },

    /// Change a customer's details
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        identifier_no: Option<String>,

        #[arg(long = "type")]
        customer_type: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        active: Option<bool>,
    },
}

/// Ticket fields shared by create and update
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TicketFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<NaiveDate>,

    /// Assignee username
    #[arg(long)]
    pub assignee: Option<String>,

    /// Reporter username
    #[arg(long)]
    pub reporter: Option<String>,

    /// Requesting customer id
    #[arg(long)]
    pub request_by: Option<i64>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TicketsCommand {
    /// List tickets; only open tickets unless --status or --any-status is given
    List {
        #[arg(long, default_value = "")]
        code: String,

        #[arg(long, default_value = "")]
        title: String,

        /// Assignee username
        #[arg(long, default_value = "")]
        assignee: String,

        /// Reporter username
        #[arg(long, default_value = "")]
        reporter: String,

        /// Allowed status; repeat for several
        #[arg(long = "status")]
        statuses: Vec<String>,

        /// Show tickets in every status
        #[arg(long, conflicts_with = "statuses")]
        any_status: bool,

        /// Requesting customer name
        #[arg(long, default_value = "")]
        request_by: String,

        /// Created on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Created on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Show one ticket
    Show { code: String },

    /// Open a new ticket
    Create {
        #[command(flatten)]
        fields: TicketFields,
    },

    /// Change a ticket
    Update {
        code: String,

        #[command(flatten)]
        fields: TicketFields,
    },

    /// List the ticket statuses the backend knows
    Statuses,
}
