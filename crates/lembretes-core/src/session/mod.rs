//! Session management: the bearer token and its renewal timer.
//!
//! A session starts at login, is refreshed in place by renewal, and ends on
//! logout or when a renewal is rejected.

mod manager;
mod state;

pub use manager::SessionManager;
pub use state::{Session, Token};
