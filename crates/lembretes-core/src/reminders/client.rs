//! ReminderClient - list, create, update and delete reminders.
//!
//! Every call needs an active session. Without one it fails with
//! [`ClientError::SessionExpired`] before touching the network.
//! Successful mutations publish [`ClientEvent::RemindersChanged`] so the UI
//! knows to reload the list.

use std::sync::Arc;

use crate::api::{paths, Reminder, ReminderId, ReminderText};
use crate::error::ClientError;
use crate::event_bus::{ClientEvent, EventBus, ReminderChange};
use crate::session::{SessionManager, Token};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Clone)]
pub struct ReminderClient {
    session: SessionManager,
    transport: Arc<dyn Transport>,
    events: Arc<EventBus>,
}

impl ReminderClient {
    /// Build a client that authenticates through `session` and shares its
    /// transport and event bus.
    pub fn new(session: SessionManager) -> Self {
        let transport = Arc::clone(session.transport());
        let events = Arc::clone(session.events());
        Self {
            session,
            transport,
            events,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn token(&self) -> Result<Token, ClientError> {
        self.session
            .current_token()
            .ok_or(ClientError::SessionExpired)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.transport.send(request).await?.error_for_status()
    }

    fn changed(&self, change: ReminderChange) {
        self.events.emit(ClientEvent::RemindersChanged { change });
    }

    /// Fetch every reminder of the logged-in user.
    pub async fn list(&self) -> Result<Vec<Reminder>, ClientError> {
        let token = self.token()?;
        let response = self
            .send(ApiRequest::get(paths::REMINDERS).bearer(token))
            .await
            .inspect_err(|e| log::warn!("Failed to load reminders: {}", e))?;

        let reminders: Vec<Reminder> = response.json()?;
        log::debug!("Loaded {} reminders", reminders.len());
        Ok(reminders)
    }

    pub async fn create(&self, text: &str) -> Result<Reminder, ClientError> {
        let token = self.token()?;
        let request =
            ApiRequest::with_json(Method::Post, paths::REMINDERS, &ReminderText { text })?
                .bearer(token);
        let response = self
            .send(request)
            .await
            .inspect_err(|e| log::warn!("Failed to add reminder: {}", e))?;

        let reminder: Reminder = response.json()?;
        log::info!("Added reminder {}", reminder.id);
        self.changed(ReminderChange::Created {
            id: reminder.id.clone(),
        });
        Ok(reminder)
    }

    pub async fn update(&self, id: &ReminderId, text: &str) -> Result<Reminder, ClientError> {
        let token = self.token()?;
        let request =
            ApiRequest::with_json(Method::Put, paths::reminder(id), &ReminderText { text })?
                .bearer(token);
        let response = self
            .send(request)
            .await
            .inspect_err(|e| log::warn!("Failed to edit reminder {}: {}", id, e))?;

        let reminder: Reminder = response.json()?;
        log::info!("Edited reminder {}", id);
        self.changed(ReminderChange::Updated { id: id.clone() });
        Ok(reminder)
    }

    /// Delete a reminder. The server's success body is ignored.
    pub async fn delete(&self, id: &ReminderId) -> Result<(), ClientError> {
        let token = self.token()?;
        self.send(ApiRequest::delete(paths::reminder(id)).bearer(token))
            .await
            .inspect_err(|e| log::warn!("Failed to delete reminder {}: {}", id, e))?;

        log::info!("Deleted reminder {}", id);
        self.changed(ReminderChange::Deleted { id: id.clone() });
        Ok(())
    }
}
