//! # lembretes-core
//!
//! Core client logic for the Lembretes reminders service.
//!
//! This crate is framework-agnostic and can be used by:
//! - the terminal front end (`lembretes-cli`)
//! - any other UI layer that subscribes to the [`EventBus`]
//!
//! ## Key Concepts
//!
//! - **Session**: the bearer token plus its renewal timer, owned by [`SessionManager`]
//! - **Reminder**: a remote record (id + text), managed through [`ReminderClient`]
//! - **ClientEvent**: what the UI layer hears about (login, forced logout, list changes)
//!
//! Session operations spawn their renewal timer on the ambient tokio runtime,
//! so they must be awaited from within one.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod event_bus;
pub mod reminders;
pub mod session;
pub mod transport;
pub mod wire_log;

// Re-export commonly used types
pub use api::{Credentials, Reminder, ReminderId};
pub use config::{ClientConfig, SessionTiming};
pub use context::{ClientContext, ClientContextBuilder, ContextError};
pub use error::{ClientError, ErrorKind};
pub use event_bus::{ClientEvent, EventBus, LogoutReason, ReminderChange};
pub use reminders::ReminderClient;
pub use session::{Session, SessionManager, Token};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
