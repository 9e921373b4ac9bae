//! Transport decorator that records traffic to a wire log.

use async_trait::async_trait;
use std::sync::Arc;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::ClientError;
use crate::wire_log::{log_line, LogHandle};

/// Account endpoints carry passwords and tokens, so their bodies are never logged.
fn is_sensitive(path: &str) -> bool {
    path.trim_start_matches('/').starts_with("usuario/")
}

/// Wraps another transport and writes each exchange to a [`LogHandle`].
pub struct LoggedTransport {
    inner: Arc<dyn Transport>,
    log_file: LogHandle,
}

impl LoggedTransport {
    pub fn new(inner: Arc<dyn Transport>, log_file: LogHandle) -> Self {
        Self { inner, log_file }
    }
}

#[async_trait]
impl Transport for LoggedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        let sensitive = is_sensitive(&path);

        let line = match (&request.body, sensitive) {
            (Some(_), true) => format!("{} {} <redacted>", method, path),
            (Some(body), false) => format!("{} {} {}", method, path, body),
            (None, _) => format!("{} {}", method, path),
        };
        log_line(&self.log_file, "REQUEST", &line);

        let result = self.inner.send(request).await;

        match &result {
            Ok(response) if sensitive && response.is_success() => log_line(
                &self.log_file,
                "RESPONSE",
                &format!("{} {} {} <redacted>", method, path, response.status),
            ),
            Ok(response) => log_line(
                &self.log_file,
                "RESPONSE",
                &format!(
                    "{} {} {} {} {}",
                    method, path, response.status, response.status_text, response.body
                ),
            ),
            Err(e) => log_line(
                &self.log_file,
                "ERROR",
                &format!("{} {} {}", method, path, e),
            ),
        }

        result
    }
}
