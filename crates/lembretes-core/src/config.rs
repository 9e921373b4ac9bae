//! Client configuration.
//!
//! Defaults match the public Lembretes service. Every value can be
//! overridden from the environment:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `LEMBRETES_API_URL` | API base URL |
//! | `LEMBRETES_TOKEN_LIFETIME_MS` | Server-side token lifetime |
//! | `LEMBRETES_RENEW_MARGIN_MS` | How long before expiry to renew |
//! | `LEMBRETES_TIMEOUT_MS` | Per-request timeout |
//! | `LEMBRETES_LOG_DIR` | Directory for wire logs (off when unset) |

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://ifsp.ddns.net/webservices/lembretes/";
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_millis(180_000);
pub const DEFAULT_RENEW_MARGIN: Duration = Duration::from_millis(60_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid number in {var}: {value:?}")]
    InvalidNumber { var: String, value: String },

    #[error("API URL must not be empty")]
    EmptyApiUrl,

    #[error("Token lifetime ({lifetime_ms} ms) must be longer than the renewal margin ({margin_ms} ms)")]
    RenewalWindow { lifetime_ms: u128, margin_ms: u128 },
}

/// Token lifetime and how early to renew it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub lifetime: Duration,
    pub renew_margin: Duration,
}

impl SessionTiming {
    /// Delay between issuing a token and renewing it.
    pub fn renewal_delay(&self) -> Duration {
        self.lifetime.saturating_sub(self.renew_margin)
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_TOKEN_LIFETIME,
            renew_margin: DEFAULT_RENEW_MARGIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timing: SessionTiming,
    pub request_timeout: Duration,
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timing: SessionTiming::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `LEMBRETES_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("LEMBRETES_API_URL") {
            config.api_url = url.trim().to_string();
        }
        if let Some(ms) = get("LEMBRETES_TOKEN_LIFETIME_MS") {
            config.timing.lifetime = parse_millis("LEMBRETES_TOKEN_LIFETIME_MS", &ms)?;
        }
        if let Some(ms) = get("LEMBRETES_RENEW_MARGIN_MS") {
            config.timing.renew_margin = parse_millis("LEMBRETES_RENEW_MARGIN_MS", &ms)?;
        }
        if let Some(ms) = get("LEMBRETES_TIMEOUT_MS") {
            config.request_timeout = parse_millis("LEMBRETES_TIMEOUT_MS", &ms)?;
        }
        if let Some(dir) = get("LEMBRETES_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Reject configurations the session manager cannot run with.
    ///
    /// A lifetime that does not exceed the margin would renew in a tight loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if self.timing.renewal_delay().is_zero() {
            return Err(ConfigError::RenewalWindow {
                lifetime_ms: self.timing.lifetime.as_millis(),
                margin_ms: self.timing.renew_margin.as_millis(),
            });
        }
        Ok(())
    }
}

fn parse_millis(var: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidNumber {
            var: var.to_string(),
            value: value.to_string(),
        })
}
