//! SessionManager - token lifecycle and proactive renewal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::time::Instant;

use super::state::{RenewalTimer, Session, SessionState, Token};
use crate::api::{paths, Credentials, TokenResponse};
use crate::config::SessionTiming;
use crate::error::ClientError;
use crate::event_bus::{ClientEvent, EventBus, LogoutReason};
use crate::transport::{ApiRequest, Method, Transport};

struct Shared {
    transport: Arc<dyn Transport>,
    events: Arc<EventBus>,
    timing: SessionTiming,
    state: Mutex<SessionState>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.cancel_timer();
    }
}

/// Owns the bearer token and renews it before the server expires it.
///
/// Cloning is cheap; every clone shares the same session. At most one
/// renewal timer is pending at any time: scheduling a new one (after login
/// or renewal) aborts the previous one, and logout aborts it outright.
///
/// The timer task only holds a weak reference, so dropping the last
/// manager handle stops renewal.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, events: Arc<EventBus>, timing: SessionTiming) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                events,
                timing,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.shared.transport
    }

    pub(crate) fn events(&self) -> &Arc<EventBus> {
        &self.shared.events
    }

    pub fn timing(&self) -> SessionTiming {
        self.shared.timing
    }

    /// Register a new account. Does not log in.
    ///
    /// The success body is whatever the server sends back.
    pub async fn signup(&self, credentials: &Credentials) -> Result<serde_json::Value, ClientError> {
        let request = ApiRequest::with_json(Method::Post, paths::SIGNUP, credentials)?;
        let response = self
            .shared
            .transport
            .send(request)
            .await?
            .error_for_status()
            .inspect_err(|e| log::warn!("Signup failed for {}: {}", credentials.login, e))?;

        log::info!("Registered account {}", credentials.login);
        Ok(response.json_or_raw())
    }

    /// Log in, store the token and start the renewal timer.
    ///
    /// Logging in over an existing session replaces it.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ClientError> {
        let request = ApiRequest::with_json(Method::Post, paths::LOGIN, credentials)?;
        let response = self
            .shared
            .transport
            .send(request)
            .await?
            .error_for_status()
            .inspect_err(|e| log::warn!("Login failed for {}: {}", credentials.login, e))?;
        let TokenResponse { token } = response.json()?;
        let token = Token::new(token);

        {
            let mut state = self.state();
            state.epoch += 1;
            state.token = Some(token.clone());
            self.schedule_renewal(&mut state);
        }

        log::info!("Logged in as {}", credentials.login);
        self.shared.events.emit(ClientEvent::LoggedIn);
        Ok(self.snapshot(token))
    }

    /// Trade the current token for a fresh one.
    ///
    /// A rejected renewal logs the user out (forced) before returning
    /// [`ClientError::RenewalFailed`]. If the session ends while the request
    /// is in flight, the result is discarded. So is a failure for a token
    /// that another renewal has already replaced.
    pub async fn renew(&self) -> Result<Session, ClientError> {
        let (current, epoch) = {
            let state = self.state();
            let current = state.token.clone().ok_or(ClientError::NotAuthenticated)?;
            (current, state.epoch)
        };

        match self.request_token(current.clone()).await {
            Ok(token) => {
                {
                    let mut state = self.state();
                    if state.epoch != epoch {
                        log::debug!("Session ended during renewal; discarding new token");
                        return Err(ClientError::SessionExpired);
                    }
                    state.token = Some(token.clone());
                    self.schedule_renewal(&mut state);
                }

                log::info!("Session token renewed");
                self.shared.events.emit(ClientEvent::TokenRenewed);
                Ok(self.snapshot(token))
            }
            Err(error) => {
                let ended = {
                    let mut state = self.state();
                    let superseded =
                        state.epoch != epoch || state.token.as_ref() != Some(&current);
                    if superseded {
                        None
                    } else {
                        Some(state.end_session())
                    }
                };

                match ended {
                    Some(had_session) => {
                        log::warn!("Token renewal failed: {}", error);
                        self.announce_logout(true, had_session);
                    }
                    None => {
                        log::debug!("Renewal failed for a superseded token: {}", error);
                    }
                }
                Err(ClientError::RenewalFailed(Box::new(error)))
            }
        }
    }

    async fn request_token(&self, current: Token) -> Result<Token, ClientError> {
        let request = ApiRequest::get(paths::RENEW).bearer(current);
        let response = self
            .shared
            .transport
            .send(request)
            .await?
            .error_for_status()?;
        let TokenResponse { token } = response.json()?;
        Ok(Token::new(token))
    }

    /// End the session: clear the token and cancel the pending renewal.
    ///
    /// `forced` marks a logout the client decided on (failed renewal); the
    /// emitted event then carries the "session expired" notice.
    pub fn logout(&self, forced: bool) {
        let had_session = self.state().end_session();
        self.announce_logout(forced, had_session);
    }

    fn announce_logout(&self, forced: bool, had_session: bool) {
        let reason = if forced {
            log::warn!("Session expired; logging out");
            LogoutReason::Expired
        } else {
            if had_session {
                log::info!("Logged out");
            }
            LogoutReason::User
        };
        self.shared.events.emit(ClientEvent::LoggedOut { reason });
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Token to authenticate a request with, if logged in.
    pub fn current_token(&self) -> Option<Token> {
        self.state().token.clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.current_token().map(|token| self.snapshot(token))
    }

    /// When the pending renewal fires.
    pub fn renewal_deadline(&self) -> Option<Instant> {
        self.state().timer.as_ref().map(|timer| timer.deadline)
    }

    /// Number of pending timers that were aborted before firing.
    pub fn cancelled_timers(&self) -> u64 {
        self.state().cancelled_timers
    }

    fn snapshot(&self, token: Token) -> Session {
        Session {
            token,
            expires_in: self.shared.timing.lifetime,
        }
    }

    fn schedule_renewal(&self, state: &mut SessionState) {
        if state.cancel_timer() {
            log::debug!("Cancelled pending renewal timer");
        }

        let generation = state.take_generation();
        let delay = self.shared.timing.renewal_delay();
        let deadline = Instant::now() + delay;
        let handle = tokio::spawn(renewal_task(
            Arc::downgrade(&self.shared),
            generation,
            deadline,
        ));

        state.timer = Some(RenewalTimer {
            generation,
            deadline,
            handle: Some(handle),
        });
        log::debug!("Token renewal scheduled in {} ms", delay.as_millis());
    }

    /// Mark timer `generation` as fired. False if it was superseded.
    fn claim_timer(&self, generation: u64) -> bool {
        let mut state = self.state();
        match state.timer.as_mut() {
            Some(timer) if timer.generation == generation => {
                timer.handle = None;
                true
            }
            _ => false,
        }
    }
}

async fn renewal_task(shared: Weak<Shared>, generation: u64, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;

    let Some(shared) = shared.upgrade() else {
        return;
    };
    let manager = SessionManager { shared };
    if !manager.claim_timer(generation) {
        return;
    }

    if let Err(e) = manager.renew().await {
        log::warn!("Scheduled token renewal failed: {}", e);
    }
}
