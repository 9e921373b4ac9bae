//! Parsing of interactive command lines.

use lembretes_core::{Credentials, ReminderId};

pub const HELP: &str = "\
Commands:
  signup <login> <senha>   create an account
  login <login> <senha>    log in
  logout                   log out
  list                     show your reminders
  add <text...>            add a reminder
  edit <id> <text...>      change a reminder's text
  delete <id>              remove a reminder
  help                     show this help
  quit                     exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Signup(Credentials),
    Login(Credentials),
    Logout,
    List,
    Add(String),
    Edit { id: ReminderId, text: String },
    Delete(ReminderId),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Split `rest` into its first word and the remaining text.
fn split_word(rest: &str) -> (&str, &str) {
    match rest.split_once(char::is_whitespace) {
        Some((word, tail)) => (word, tail.trim()),
        None => (rest, ""),
    }
}

fn credentials(rest: &str, usage: &'static str) -> Result<Credentials, ParseError> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(login), Some(password), None) => Ok(Credentials::new(login, password)),
        _ => Err(ParseError::Usage(usage)),
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = split_word(line);
    let command = match name.to_ascii_lowercase().as_str() {
        "signup" => Command::Signup(credentials(rest, "signup <login> <senha>")?),
        "login" => Command::Login(credentials(rest, "login <login> <senha>")?),
        "logout" => Command::Logout,
        "list" | "ls" => Command::List,
        "add" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("add <text...>"));
            }
            Command::Add(rest.to_string())
        }
        "edit" => {
            let (id, text) = split_word(rest);
            if id.is_empty() || text.is_empty() {
                return Err(ParseError::Usage("edit <id> <text...>"));
            }
            Command::Edit {
                id: ReminderId::new(id),
                text: text.to_string(),
            }
        }
        "delete" | "rm" => {
            let (id, extra) = split_word(rest);
            if id.is_empty() || !extra.is_empty() {
                return Err(ParseError::Usage("delete <id>"));
            }
            Command::Delete(ReminderId::new(id))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
