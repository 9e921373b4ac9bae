//! reqwest-backed transport.

use async_trait::async_trait;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Talks to the real API over HTTP(S).
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.api_url))
    }

    /// Use a preconfigured client (proxies, custom TLS, ...).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Join an API path onto the base URL with exactly one slash.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            log::error!("{} {} failed: {}", request.method.as_str(), request.path, e);
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        log::debug!(
            "{} {} -> {}",
            request.method.as_str(),
            request.path,
            status.as_u16()
        );

        Ok(ApiResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}
