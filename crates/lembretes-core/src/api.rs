//! Wire types and endpoint paths of the remote reminders API.
//!
//! Field names on the wire are Portuguese (`senha`, `texto`); the Rust side
//! uses English names and renames at the serde boundary.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Endpoint paths, relative to the configured API base URL.
pub mod paths {
    use super::ReminderId;

    pub const SIGNUP: &str = "usuario/signup";
    pub const LOGIN: &str = "usuario/login";
    pub const RENEW: &str = "usuario/renew";
    pub const REMINDERS: &str = "lembrete";

    /// Path of a single reminder: `lembrete/{id}`.
    pub fn reminder(id: &ReminderId) -> String {
        format!("{}/{}", REMINDERS, id)
    }
}

/// Login and signup payload.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub login: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Body returned by login and renew.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Opaque reminder identifier.
///
/// The server may send ids as JSON numbers or strings; both decode to the
/// same textual form, which is what goes into `lembrete/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReminderId(pub String);

impl ReminderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReminderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ReminderId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ReminderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => ReminderId(n.to_string()),
            RawId::Text(s) => ReminderId(s),
        })
    }
}

/// A reminder record as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    #[serde(rename = "texto")]
    pub text: String,
}

/// Body of create and update requests.
#[derive(Debug, Serialize)]
pub(crate) struct ReminderText<'a> {
    #[serde(rename = "texto")]
    pub text: &'a str,
}
