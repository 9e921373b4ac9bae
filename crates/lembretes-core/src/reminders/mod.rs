//! Authenticated CRUD on the user's reminders.

mod client;

pub use client::ReminderClient;
