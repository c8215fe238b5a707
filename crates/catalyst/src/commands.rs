//! One handler per subcommand

use anyhow::{bail, Context, Result};
use catalyst_api::{CustomerUpdate, Ticket, TicketDraft, UserRef, UserUpdate};
use catalyst_store::{AuditEvent, AuditEventType};
use catalyst_core::Session;
use catalyst_util::{format_datetime_full, format_duration, saturating_until};
use chrono::{DateTime, Local};
use catalyst_views::{
    customer_columns, customer_form, guard, reset_password_form, ticket_columns, ticket_form,
    user_columns, user_form, CustomerFilter, FieldError, FieldKind, Filter, FormModel, Navigation,
    TicketFilter, UserFilter,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::{Command, CustomersCommand, TicketFields, TicketsCommand, UsersCommand};
use crate::console::Console;
use crate::render::{build_table, emit_table, print_form};

/// Where missing secrets come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Ask on the terminal
    Terminal,
    /// No prompting; the value must be on the command line
    Inline,
}

pub async fn run(console: &Console, command: Command, input: Input) -> Result<()> {
    if let Some(route) = command.route()
        && let Navigation::Redirect(redirect) = guard(route, console.is_logged_in())
    {
        bail!("Not logged in (redirecting to {})", redirect);
    }

    debug!(route = ?command.route(), "Running command");

    match command {
        Command::Login { username, password } => login(console, &username, password, input).await,
        Command::Logout => logout(console).await,
        Command::Status { audit } => status(console, audit),
        Command::ForgotPassword { email } => {
            console.auth.send_password_reset_email(&email).await?;
            println!("Password reset email sent to {}", email);
            Ok(())
        }
        Command::ResetPassword {
            token,
            new_password,
            confirm_password,
        } => reset_password(console, &token, new_password, confirm_password, input).await,
        Command::Users(cmd) => users(console, cmd).await,
        Command::Customers(cmd) => customers(console, cmd).await,
        Command::Tickets(cmd) => tickets(console, cmd).await,
        Command::Shell => bail!("Already in the shell"),
    }
}

fn read_secret(prompt: &str, given: Option<String>, input: Input) -> Result<String> {
    match (given, input) {
        (Some(value), _) => Ok(value),
        (None, Input::Terminal) => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .context("Failed to read password"),
        (None, Input::Inline) => bail!("{} must be given on the command line here", prompt),
    }
}

async fn login(
    console: &Console,
    username: &str,
    password: Option<String>,
    input: Input,
) -> Result<()> {
    let password = read_secret("Password", password, input)?;
    let user = console.auth.login(username, &password).await?;

    println!("Logged in as {} ({})", user.username, user.role);
    if let Some(deadline) = console.next_deadline()? {
        println!("Idle logout at {}", format_datetime_full(&deadline));
    }
    Ok(())
}

async fn logout(console: &Console) -> Result<()> {
    match console.auth.logout().await? {
        Some(_) => println!("Logged out"),
        None => println!("Not logged in"),
    }
    Ok(())
}

fn status(console: &Console, audit: usize) -> Result<()> {
    let now = catalyst_util::now();
    println!("Backend: {}", console.settings.api.base_url);
    {
        let guard = catalyst_core::lock_guard(&console.guard)?;
        match guard.session() {
            Some(session) => {
                for line in session_lines(session, now) {
                    println!("{}", line);
                }
            }
            None => println!("Not logged in"),
        }
    }

    if audit > 0 {
        let events = console
            .store
            .get_recent_audits(audit)
            .context("Failed to read audit log")?;
        if !events.is_empty() {
            println!();
            println!("Recent activity:");
            for event in &events {
                println!("  {}", describe_audit(event));
            }
        }
    }

    Ok(())
}

/// Session summary for `status`; each deadline shows its own time left
fn session_lines(session: &Session, now: DateTime<Local>) -> Vec<String> {
    let idle_at = session.inactivity_deadline();
    vec![
        format!("Logged in as {} ({})", session.user.username, session.user.role),
        format!("  Session:      {}", session.session_id),
        format!("  Issued:       {}", format_datetime_full(&session.issued_at)),
        format!(
            "  Expires:      {} ({} left)",
            format_datetime_full(&session.absolute_expiry),
            format_duration(saturating_until(session.absolute_expiry, now))
        ),
        format!(
            "  Idle logout:  {} ({} left)",
            format_datetime_full(&idle_at),
            format_duration(saturating_until(idle_at, now))
        ),
    ]
}

pub fn describe_audit(event: &AuditEvent) -> String {
    let what = match &event.event {
        AuditEventType::LoggedIn { username, .. } => format!("{} logged in", username),
        AuditEventType::LoginFailed { username } => format!("login failed for {}", username),
        AuditEventType::SessionRestored { username, .. } => {
            format!("session restored for {}", username)
        }
        AuditEventType::CredentialsDiscarded { error } => {
            format!("unreadable saved session discarded ({})", error)
        }
        AuditEventType::LoggedOut {
            username, reason, ..
        } => format!("{} logged out ({})", username, reason),
    };
    format!("{}  {}", format_datetime_full(&event.timestamp), what)
}

async fn reset_password(
    console: &Console,
    token: &str,
    new_password: Option<String>,
    confirm_password: Option<String>,
    input: Input,
) -> Result<()> {
    if !console.auth.is_valid_password_reset_token(token).await? {
        bail!("This password reset link is invalid or has expired");
    }

    let new_password = read_secret("New password", new_password, input)?;
    let confirm_password = read_secret("Confirm password", confirm_password, input)?;

    let mut form = reset_password_form();
    form.set_value("newPassword", json!(new_password))?;
    form.set_value("confirmPassword", json!(confirm_password))?;
    check_form(&form)?;

    console
        .auth
        .reset_password(token, &new_password, &confirm_password)
        .await?;
    println!("Password has been reset. You can now log in.");
    Ok(())
}

async fn users(console: &Console, cmd: UsersCommand) -> Result<()> {
    match cmd {
        UsersCommand::List {
            username,
            full_name,
            email,
            role,
            status,
            active_only,
            table,
        } => {
            let all = if active_only {
                console.users.active().await?
            } else {
                console.users.all().await?
            };
            let filter = UserFilter {
                username,
                full_name,
                email,
                role,
                status: status.unwrap_or_default(),
            };
            let shown: Vec<_> = filter.apply(&all);
            let view = build_table(user_columns(), &shown, &table)?;
            emit_table(&view, &table)
        }
        UsersCommand::Show { username } => {
            let user = console.users.by_username(&username).await?;
            let form = FormModel::for_record(user_form(&[]), &serde_json::to_value(&user)?);
            print_form(&user.full_name, &form);
            Ok(())
        }
        UsersCommand::Update {
            username,
            first_name,
            last_name,
            email,
            role,
            active,
        } => {
            let user = console.users.by_username(&username).await?;
            let roles = console.users.roles().await?;
            let mut form =
                FormModel::for_record(user_form(&roles), &serde_json::to_value(&user)?);
            form.toggle_edit();

            set_if(&mut form, "firstName", first_name.as_ref())?;
            set_if(&mut form, "lastName", last_name.as_ref())?;
            set_if(&mut form, "email", email.as_ref())?;
            set_if(&mut form, "role", role.as_ref())?;
            set_if(&mut form, "active", active.as_ref())?;
            check_form(&form)?;

            let update = UserUpdate {
                username,
                first_name,
                last_name,
                email,
                role,
                active,
            };
            let saved = console.users.update(&update).await?;
            println!("Updated user {}", saved.username);
            Ok(())
        }
    }
}

async fn customers(console: &Console, cmd: CustomersCommand) -> Result<()> {
    match cmd {
        CustomersCommand::List {
            name,
            identifier_no,
            email,
            phone,
            customer_type,
            status,
            table,
        } => {
            let all = console.customers.all().await?;
            let filter = CustomerFilter {
                name,
                identifier_no,
                email,
                phone,
                customer_type,
                status: status.unwrap_or_default(),
            };
            let shown: Vec<_> = filter.apply(&all);
            let view = build_table(customer_columns(), &shown, &table)?;
            emit_table(&view, &table)
        }
        CustomersCommand::Show { id } => {
            let customer = console.customers.by_id(id).await?;
            let form =
                FormModel::for_record(customer_form(&[]), &serde_json::to_value(&customer)?);
            print_form("Customer Details", &form);
            Ok(())
        }
        CustomersCommand::Update {
            id,
            name,
            identifier_no,
            customer_type,
            email,
            phone,
            address,
            active,
        } => {
            let customer = console.customers.by_id(id).await?;
            let types = console.customers.types().await?;
            let mut form =
                FormModel::for_record(customer_form(&types), &serde_json::to_value(&customer)?);
            form.toggle_edit();

            set_if(&mut form, "name", name.as_ref())?;
            set_if(&mut form, "identifierNo", identifier_no.as_ref())?;
            set_if(&mut form, "type", customer_type.as_ref())?;
            set_if(&mut form, "email", email.as_ref())?;
            set_if(&mut form, "phone", phone.as_ref())?;
            set_if(&mut form, "address", address.as_ref())?;
            set_if(&mut form, "active", active.as_ref())?;
            check_form(&form)?;

            let update = CustomerUpdate {
                id,
                name,
                identifier_no,
                customer_type,
                email,
                phone,
                address,
                active,
            };
            let saved = console.customers.update(&update).await?;
            println!("Updated customer {} ({})", saved.name, saved.id);
            Ok(())
        }
    }
}

async fn tickets(console: &Console, cmd: TicketsCommand) -> Result<()> {
    match cmd {
        TicketsCommand::List {
            code,
            title,
            assignee,
            reporter,
            statuses,
            any_status,
            request_by,
            from,
            to,
            table,
        } => {
            let all = console.tickets.all().await?;
            let mut filter = TicketFilter {
                code,
                title,
                assignee,
                reporter,
                request_by,
                created_from: from,
                created_to: to,
                ..TicketFilter::default()
            };
            if any_status {
                filter.statuses.clear();
            } else if !statuses.is_empty() {
                filter.statuses = statuses.into_iter().collect();
            }

            let shown: Vec<_> = filter.apply(&all);
            let view = build_table(ticket_columns(), &shown, &table)?;
            emit_table(&view, &table)
        }
        TicketsCommand::Show { code } => {
            let ticket = console.tickets.by_code(&code).await?;
            print_ticket(&ticket);
            Ok(())
        }
        TicketsCommand::Create { fields } => {
            let statuses = console.tickets.statuses().await?;
            let users = to_values(&console.users.active().await?)?;
            let customers = to_values(&console.customers.all().await?)?;

            let mut form = FormModel::new(ticket_form(&statuses, users, customers));
            fill_ticket_form(&mut form, &fields)?;
            check_form(&form)?;

            let ticket = console.tickets.create(&ticket_draft(fields)).await?;
            println!("Created ticket {}", ticket.code);
            Ok(())
        }
        TicketsCommand::Update { code, fields } => {
            let current = console.tickets.by_code(&code).await?;
            let statuses = console.tickets.statuses().await?;
            if let Some(status) = &fields.status
                && !statuses.contains(status)
            {
                bail!("Unknown status '{}'; choose from: {}", status, statuses.join(", "));
            }

            let draft = ticket_draft(fields);
            if serde_json::to_value(&draft)? == json!({}) {
                bail!("Nothing to update on ticket {}", current.code);
            }

            let saved = console.tickets.update(&code, &draft).await?;
            println!("Updated ticket {} ({})", saved.code, saved.status);
            Ok(())
        }
        TicketsCommand::Statuses => {
            for status in console.tickets.statuses().await? {
                println!("{}", status);
            }
            Ok(())
        }
    }
}

fn set_if<T: Serialize>(form: &mut FormModel, field: &str, value: Option<&T>) -> Result<()> {
    if let Some(value) = value {
        form.set_value(field, serde_json::to_value(value)?)?;
    }
    Ok(())
}

fn fill_ticket_form(form: &mut FormModel, fields: &TicketFields) -> Result<()> {
    set_if(form, "title", fields.title.as_ref())?;
    set_if(form, "status", fields.status.as_ref())?;
    set_if(form, "dueDate", fields.due_date.map(|d| d.to_string()).as_ref())?;
    set_if(form, "assignee", fields.assignee.as_ref())?;
    set_if(form, "reporter", fields.reporter.as_ref())?;
    set_if(form, "requestBy", fields.request_by.as_ref())?;
    set_if(form, "description", fields.description.as_ref())?;
    Ok(())
}

fn ticket_draft(fields: TicketFields) -> TicketDraft {
    TicketDraft {
        title: fields.title,
        status: fields.status,
        due_date: fields.due_date.map(|d| d.to_string()),
        assignee: fields.assignee,
        reporter: fields.reporter,
        request_by: fields.request_by,
        description: fields.description,
    }
}

/// Validate a filled form, including that every picked value is one of the
/// field's choices
pub fn check_form(form: &FormModel) -> Result<()> {
    let mut problems: Vec<String> = form
        .validate()
        .err()
        .unwrap_or_default()
        .iter()
        .map(describe_field_error)
        .collect();

    for field in form.fields() {
        if !matches!(field.kind, FieldKind::Dropdown | FieldKind::Radio) || field.options.is_empty()
        {
            continue;
        }
        let Some(value) = form.value(&field.name) else {
            continue;
        };
        if value.is_null() || value == &json!("") {
            continue;
        }
        if !field.options.iter().any(|o| &field.option_value(o) == value) {
            problems.push(format!("{}: '{}' is not a valid choice", field.label, form.text(&field.name)));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        bail!("Invalid input:\n  {}", problems.join("\n  "))
    }
}

fn describe_field_error(error: &FieldError) -> String {
    format!("{}: {}", error.field(), error.message())
}

fn to_values<T: Serialize>(items: &[T]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(Into::into))
        .collect()
}

fn user_label(user: &Option<UserRef>) -> String {
    match user {
        Some(UserRef {
            username,
            full_name: Some(full_name),
            ..
        }) => format!("{} - {}", username, full_name),
        Some(user) => user.username.clone(),
        None => String::new(),
    }
}

fn print_ticket(ticket: &Ticket) {
    println!("{}  {}", ticket.code, ticket.title);
    println!("  Status:        {}", ticket.status);
    println!("  Assignee:      {}", user_label(&ticket.assignee));
    println!("  Reporter:      {}", user_label(&ticket.reporter));
    println!(
        "  Requested By:  {}",
        ticket.request_by.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    );
    println!(
        "  Created:       {}",
        ticket.created_at_date.as_deref().unwrap_or("")
    );
    println!("  Due Date:      {}", ticket.due_date.as_deref().unwrap_or(""));
    if let Some(description) = &ticket.description {
        println!();
        println!("{}", description);
    }
}
