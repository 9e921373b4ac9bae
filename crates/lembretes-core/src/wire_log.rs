//! Append-only request/response logs.
//!
//! Each client run can keep a plain-text record of what went over the wire,
//! one timestamped line per request and per response.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{SecondsFormat, Utc};

/// Thread-safe handle to an append-only log file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// Current UTC time as ISO 8601 with milliseconds (e.g. 2026-02-04T10:15:30.123Z).
fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write a timestamped line to the log file (if present).
pub fn log_line(handle: &LogHandle, direction: &str, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let _ = writeln!(file, "[{}] {}: {}", utc_timestamp(), direction, data);
            let _ = file.flush();
        }
    }
}

/// Open (or create) `{log_dir}/{log_id}.log` and return a shared handle.
///
/// Without a directory, or if the file cannot be opened, the handle is empty
/// and logging is a no-op.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir)
            .map_err(|e| log::warn!("Cannot create log dir {}: {}", dir.display(), e))
            .ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", log_id)))
            .map_err(|e| log::warn!("Cannot open wire log {}: {}", log_id, e))
            .ok()
    });
    Arc::new(Mutex::new(file))
}
