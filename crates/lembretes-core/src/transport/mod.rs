//! HTTP seam between the client logic and the network.
//!
//! Session and reminder code only ever build an [`ApiRequest`] and hand it to
//! a [`Transport`]. Production uses [`HttpTransport`]; tests swap in an
//! in-memory service.

mod http;
mod logged;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpTransport;
pub use logged::LoggedTransport;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::session::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A request against the API, with the path relative to the base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<Token>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// A request carrying `body` as JSON.
    pub fn with_json<T: Serialize>(
        method: Method,
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(Self {
            body: Some(body),
            ..Self::new(method, path)
        })
    }

    /// Authenticate with `Authorization: Bearer <token>`.
    pub fn bearer(mut self, token: Token) -> Self {
        self.bearer = Some(token);
        self
    }
}

/// What came back from the server. Non-2xx statuses are still `Ok` at this level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn non-2xx responses into [`ClientError::Remote`].
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_response(
                self.status,
                &self.status_text,
                &self.body,
            ))
        }
    }

    /// Decode the body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Decode a body whose shape the API leaves open.
    ///
    /// Empty bodies become `null` and non-JSON bodies are kept as a string.
    pub fn json_or_raw(&self) -> serde_json::Value {
        let body = self.body.trim();
        if body.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
    }
}

/// Sends [`ApiRequest`]s somewhere and reports what came back.
///
/// Implementations return `Err` only when no response was received
/// ([`ClientError::Network`]); HTTP error statuses are ordinary responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}
