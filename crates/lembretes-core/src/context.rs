//! ClientContext - everything a front end needs to talk to the service.
//!
//! The builder wires one transport, one event bus and one session into a
//! [`SessionManager`] and a [`ReminderClient`] that share them. Front ends
//! (the CLI today) hold a `ClientContext` and forward user actions to it.
//!
//! ```text
//!            ┌──────────────────────────┐
//!            │      ClientContext       │
//!            ├──────────────────────────┤
//!            │  - EventBus              │
//!            │  - SessionManager ──┐    │
//!            │  - ReminderClient ──┤    │
//!            └─────────────────────┼────┘
//!                                  ▼
//!                      Transport (HTTP, wire log)
//! ```

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::event_bus::EventBus;
use crate::reminders::ReminderClient;
use crate::session::SessionManager;
use crate::transport::{HttpTransport, LoggedTransport, Transport};
use crate::wire_log::open_log_file;

const DEFAULT_LOG_ID: &str = "lembretes";

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create HTTP client: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Configuration for building a [`ClientContext`].
#[derive(Default)]
pub struct ClientContextBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    event_bus: Option<Arc<EventBus>>,
    log_id: Option<String>,
}

impl ClientContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an existing transport instead of HTTP (for testing).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an existing EventBus.
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// File stem of the wire log inside `config.log_dir`.
    pub fn log_id(mut self, id: impl Into<String>) -> Self {
        self.log_id = Some(id.into());
        self
    }

    /// Validate the configuration and build the context.
    ///
    /// When `config.log_dir` is set, all traffic goes through a
    /// [`LoggedTransport`] writing to `<log_dir>/<log_id>.log`.
    pub fn build(self) -> Result<ClientContext, ContextError> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };

        let transport: Arc<dyn Transport> = match &self.config.log_dir {
            Some(dir) => {
                let log_id = self.log_id.as_deref().unwrap_or(DEFAULT_LOG_ID);
                log::info!("Writing wire log to {}", dir.display());
                Arc::new(LoggedTransport::new(
                    transport,
                    open_log_file(Some(dir), log_id),
                ))
            }
            None => transport,
        };

        let event_bus = self.event_bus.unwrap_or_else(|| Arc::new(EventBus::new()));
        let session = SessionManager::new(transport, Arc::clone(&event_bus), self.config.timing);
        let reminders = ReminderClient::new(session.clone());

        Ok(ClientContext {
            config: Arc::new(self.config),
            event_bus,
            session,
            reminders,
        })
    }
}

/// Shared state for one signed-in (or signed-out) user.
///
/// Cloning is cheap and every clone sees the same session.
#[derive(Clone)]
pub struct ClientContext {
    config: Arc<ClientConfig>,
    pub event_bus: Arc<EventBus>,
    pub session: SessionManager,
    pub reminders: ReminderClient,
}

impl ClientContext {
    pub fn builder() -> ClientContextBuilder {
        ClientContextBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
