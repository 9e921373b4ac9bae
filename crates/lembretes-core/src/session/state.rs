//! Session state: token, renewal timer and the bookkeeping around them.

use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Opaque bearer credential.
///
/// `Debug` never prints the value, so tokens stay out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Snapshot of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Token,
    /// Server-side lifetime of `token` from the moment it was issued.
    pub expires_in: Duration,
}

/// The single pending renewal.
pub(crate) struct RenewalTimer {
    pub generation: u64,
    pub deadline: Instant,
    /// `None` once the timer has fired and its renewal is in flight.
    pub handle: Option<JoinHandle<()>>,
}

impl RenewalTimer {
    /// Abort the timer task. Returns true if it had not fired yet.
    pub fn cancel(self) -> bool {
        match self.handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

#[derive(Default)]
pub(crate) struct SessionState {
    pub token: Option<Token>,
    /// Bumped on every login and logout; stale renewals compare against it.
    pub epoch: u64,
    pub next_generation: u64,
    pub timer: Option<RenewalTimer>,
    pub cancelled_timers: u64,
}

impl SessionState {
    /// Drop the pending timer, aborting it if it has not fired.
    pub fn cancel_timer(&mut self) -> bool {
        let cancelled = self.timer.take().is_some_and(RenewalTimer::cancel);
        if cancelled {
            self.cancelled_timers += 1;
        }
        cancelled
    }

    /// Clear the token and the timer and start a new epoch, all under one
    /// lock. Returns whether a token was held.
    pub fn end_session(&mut self) -> bool {
        self.epoch += 1;
        self.cancel_timer();
        self.token.take().is_some()
    }

    pub fn take_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }
}
