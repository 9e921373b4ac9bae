//! Error types shared by the session manager and the reminder client.
//!
//! Every failure ends up in front of the user as a displayable message, so
//! `Display` on [`ClientError`] is the message. [`ErrorKind`] is the coarse
//! classification UI layers branch on.

use serde_json::Value;
use thiserror::Error;

/// Shown whenever the user has to log in again.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, expired or rejected token.
    Authentication,
    /// The server answered with something other than success.
    Remote,
    /// The request never got an answer.
    Network,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Session expired. Please log in again.")]
    SessionExpired,

    #[error("Session renewal failed: {0}")]
    RenewalFailed(#[source] Box<ClientError>),

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ClientError {
    /// Build a [`ClientError::Remote`] from a non-success response.
    ///
    /// The message prefers a `msg` field in a JSON body, then the raw body,
    /// then the status text.
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Self {
        ClientError::Remote {
            status,
            message: best_message(status, status_text, body),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotAuthenticated
            | ClientError::SessionExpired
            | ClientError::RenewalFailed(_) => ErrorKind::Authentication,
            ClientError::Remote { .. } | ClientError::Decode(_) => ErrorKind::Remote,
            ClientError::Network(_) => ErrorKind::Network,
        }
    }

    /// HTTP status of a remote failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::RenewalFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Message meant for the person at the keyboard.
    ///
    /// A failed renewal has already logged the user out, so it reads the same
    /// as an expired session.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::RenewalFailed(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

fn best_message(status: u16, status_text: &str, body: &str) -> String {
    let body = body.trim();

    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = fields.get("msg").and_then(msg_text) {
            return msg;
        }
    }

    if !body.is_empty() {
        return body.to_string();
    }

    if !status_text.trim().is_empty() {
        return status_text.trim().to_string();
    }

    format!("HTTP {}", status)
}

/// A `msg` value worth showing. Null, `false`, zero and blank strings are not.
fn msg_text(msg: &Value) -> Option<String> {
    match msg {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::String(_) | Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
