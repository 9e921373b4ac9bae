//! Client event broadcasting.
//!
//! The EventBus is how the core talks back to whatever UI sits on top of it:
//! logins, forced logouts and reminder changes are published here instead of
//! being shown directly.
//!
//! # Example
//!
//! ```rust
//! use lembretes_core::event_bus::{ClientEvent, EventBus, LogoutReason};
//!
//! let event_bus = EventBus::new();
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.emit(ClientEvent::LoggedOut { reason: LogoutReason::Expired });
//!
//! let event = rx.try_recv().unwrap();
//! assert_eq!(event.notice(), Some("Session expired. Please log in again."));
//! ```

use crate::api::ReminderId;
use crate::error::SESSION_EXPIRED_MESSAGE;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity for the event bus.
/// Events beyond this capacity will cause slow subscribers to miss events (lag).
const DEFAULT_CAPACITY: usize = 64;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogoutReason {
    /// The user asked to log out.
    User,
    /// Renewal failed and the client logged the user out.
    Expired,
}

/// What happened to the reminder list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ReminderChange {
    Created { id: ReminderId },
    Updated { id: ReminderId },
    Deleted { id: ReminderId },
}

impl ReminderChange {
    pub fn id(&self) -> &ReminderId {
        match self {
            ReminderChange::Created { id }
            | ReminderChange::Updated { id }
            | ReminderChange::Deleted { id } => id,
        }
    }
}

/// Events published by the session manager and reminder client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClientEvent {
    LoggedIn,
    TokenRenewed,
    LoggedOut { reason: LogoutReason },
    /// The reminder list changed; UIs should reload it.
    RemindersChanged { change: ReminderChange },
}

impl ClientEvent {
    /// Event type identifier, e.g. for forwarding over a socket.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::LoggedIn => "session:logged_in",
            ClientEvent::TokenRenewed => "session:renewed",
            ClientEvent::LoggedOut { .. } => "session:logged_out",
            ClientEvent::RemindersChanged { .. } => "reminders:changed",
        }
    }

    /// User-visible notice carried by this event, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            ClientEvent::LoggedOut {
                reason: LogoutReason::Expired,
            } => Some(SESSION_EXPIRED_MESSAGE),
            _ => None,
        }
    }
}

/// Broadcasts [`ClientEvent`]s to any number of subscribers.
///
/// Uses a tokio broadcast channel internally, allowing multiple consumers to
/// receive the same events concurrently.
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a new EventBus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new EventBus with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// If there are no subscribers, the event is dropped and 0 is returned.
    pub fn emit(&self, event: ClientEvent) -> usize {
        log::debug!("Emitting {}", event.event_type());
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all future events on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Get the current number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod client_event {
        use super::*;

        #[test]
        fn serializes_with_kind_tag() {
            let event = ClientEvent::LoggedOut {
                reason: LogoutReason::Expired,
            };
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value, json!({"kind": "loggedOut", "reason": "expired"}));
        }

        #[test]
        fn reminder_change_roundtrip() {
            let event = ClientEvent::RemindersChanged {
                change: ReminderChange::Deleted {
                    id: ReminderId::from("7"),
                },
            };
            let json = serde_json::to_string(&event).unwrap();
            let parsed: ClientEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, event);
        }

        #[test]
        fn only_forced_logout_carries_notice() {
            let forced = ClientEvent::LoggedOut {
                reason: LogoutReason::Expired,
            };
            let voluntary = ClientEvent::LoggedOut {
                reason: LogoutReason::User,
            };
            assert_eq!(forced.notice(), Some(SESSION_EXPIRED_MESSAGE));
            assert_eq!(voluntary.notice(), None);
            assert_eq!(ClientEvent::LoggedIn.notice(), None);
        }

        #[test]
        fn event_types() {
            assert_eq!(ClientEvent::LoggedIn.event_type(), "session:logged_in");
            assert_eq!(ClientEvent::TokenRenewed.event_type(), "session:renewed");
            let change = ClientEvent::RemindersChanged {
                change: ReminderChange::Created {
                    id: ReminderId::from("1"),
                },
            };
            assert_eq!(change.event_type(), "reminders:changed");
        }

        #[test]
        fn change_exposes_id() {
            let change = ReminderChange::Updated {
                id: ReminderId::from("42"),
            };
            assert_eq!(change.id().as_str(), "42");
        }
    }

    mod event_bus {
        use super::*;

        #[test]
        fn new_creates_bus() {
            let bus = EventBus::new();
            assert_eq!(bus.subscriber_count(), 0);
        }

        #[test]
        fn subscribe_increments_count() {
            let bus = EventBus::default();
            let _rx1 = bus.subscribe();
            let _rx2 = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 2);
        }

        #[test]
        fn dropped_subscriber_decrements_count() {
            let bus = EventBus::new();
            let rx = bus.subscribe();
            drop(rx);
            assert_eq!(bus.subscriber_count(), 0);
        }

        #[test]
        fn emit_returns_zero_with_no_subscribers() {
            let bus = EventBus::new();
            assert_eq!(bus.emit(ClientEvent::LoggedIn), 0);
        }

        #[tokio::test]
        async fn multiple_subscribers_receive_same_event() {
            let bus = EventBus::new();
            let mut rx1 = bus.subscribe();
            let mut rx2 = bus.subscribe();

            assert_eq!(bus.emit(ClientEvent::TokenRenewed), 2);

            assert_eq!(rx1.recv().await.unwrap(), ClientEvent::TokenRenewed);
            assert_eq!(rx2.recv().await.unwrap(), ClientEvent::TokenRenewed);
        }

        #[tokio::test]
        async fn events_arrive_in_order() {
            let bus = EventBus::new();
            let mut rx = bus.subscribe();

            bus.emit(ClientEvent::LoggedIn);
            bus.emit(ClientEvent::TokenRenewed);
            bus.emit(ClientEvent::LoggedOut {
                reason: LogoutReason::User,
            });

            assert_eq!(rx.recv().await.unwrap(), ClientEvent::LoggedIn);
            assert_eq!(rx.recv().await.unwrap(), ClientEvent::TokenRenewed);
            assert_eq!(
                rx.recv().await.unwrap(),
                ClientEvent::LoggedOut {
                    reason: LogoutReason::User
                }
            );
        }

        #[test]
        fn late_subscriber_misses_old_events() {
            let bus = EventBus::new();
            bus.emit(ClientEvent::LoggedIn);

            let mut late = bus.subscribe();
            assert!(late.try_recv().is_err());
        }
    }
}
