//! Interactive loop: read commands from stdin, print results to stdout.

use std::io::{self, Write};

use lembretes_core::{ClientContext, ClientError, ClientEvent, Reminder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::command::{parse_command, Command, HELP};

pub fn format_reminders(reminders: &[Reminder]) -> String {
    if reminders.is_empty() {
        return "No reminders.".to_string();
    }
    reminders
        .iter()
        .map(|r| format!("[{}] {}", r.id, r.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn describe_error(operation: &str, error: &ClientError) -> String {
    format!("{} failed: {}", operation, error.user_message())
}

async fn print_list<W: Write>(ctx: &ClientContext, out: &mut W) -> io::Result<()> {
    match ctx.reminders.list().await {
        Ok(reminders) => writeln!(out, "{}", format_reminders(&reminders)),
        Err(e) => writeln!(out, "{}", describe_error("Loading reminders", &e)),
    }
}

/// React to one client event: reload the list after login and every change,
/// and announce forced logouts.
async fn handle_event<W: Write>(
    ctx: &ClientContext,
    event: &ClientEvent,
    out: &mut W,
) -> io::Result<()> {
    if let Some(notice) = event.notice() {
        writeln!(out, "{}", notice)?;
    }
    match event {
        ClientEvent::LoggedIn | ClientEvent::RemindersChanged { .. } => print_list(ctx, out).await,
        ClientEvent::TokenRenewed | ClientEvent::LoggedOut { .. } => Ok(()),
    }
}

pub fn spawn_event_printer<W>(ctx: ClientContext, mut out: W) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    let mut rx = ctx.event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("Event printer skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if let Err(e) = handle_event(&ctx, &event, &mut out).await {
                log::error!("Failed to write output: {}", e);
                break;
            }
        }
    })
}

/// Run one command. Returns false when the user asked to quit.
async fn execute<W: Write>(ctx: &ClientContext, command: Command, out: &mut W) -> io::Result<bool> {
    match command {
        Command::Signup(credentials) => match ctx.session.signup(&credentials).await {
            Ok(_) => writeln!(
                out,
                "Account {} created. You can log in now.",
                credentials.login
            )?,
            Err(e) => writeln!(out, "{}", describe_error("Sign-up", &e))?,
        },
        Command::Login(credentials) => match ctx.session.login(&credentials).await {
            Ok(_) => writeln!(out, "Logged in as {}.", credentials.login)?,
            Err(e) => writeln!(out, "{}", describe_error("Login", &e))?,
        },
        Command::Logout => {
            ctx.session.logout(false);
            writeln!(out, "Logged out.")?;
        }
        Command::List => print_list(ctx, out).await?,
        Command::Add(text) => {
            if let Err(e) = ctx.reminders.create(&text).await {
                writeln!(out, "{}", describe_error("Adding reminder", &e))?;
            }
        }
        Command::Edit { id, text } => {
            if let Err(e) = ctx.reminders.update(&id, &text).await {
                writeln!(out, "{}", describe_error("Editing reminder", &e))?;
            }
        }
        Command::Delete(id) => {
            if let Err(e) = ctx.reminders.delete(&id).await {
                writeln!(out, "{}", describe_error("Deleting reminder", &e))?;
            }
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

pub async fn run(ctx: ClientContext) -> io::Result<()> {
    let printer = spawn_event_printer(ctx.clone(), io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = io::stdout();

    writeln!(out, "Lembretes. Type 'help' for commands.")?;
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(command)) => {
                if !execute(&ctx, command, &mut out).await? {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => writeln!(out, "{}", e)?,
        }
    }

    ctx.session.logout(false);
    printer.abort();
    Ok(())
}
